//! Post-test diagnostic collection and failure-evidence capture.
//!
//! Runs after every test method, whatever its outcome, and always last in
//! teardown so rows produced by the suite's own teardown are inspected too.
//! Evidence capture happens before the log scan: the scan may raise, and a
//! screenshot taken after the raise would never exist.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use warmboot_core::{BrowserDriver, LogFilter, Platform, SuiteHooks};
use warmboot_error::{Result, WarmbootError};

use crate::ignore::IgnoreMatcher;
use crate::render::render_row;

/// Recorded status of the just-completed test method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Skipped,
    Warning,
    Failure,
    Error,
}

impl TestStatus {
    /// Statuses that trigger evidence capture.
    #[must_use]
    pub const fn is_failing(self) -> bool {
        matches!(self, Self::Warning | Self::Failure | Self::Error)
    }
}

/// Viewport used while capturing a failure screenshot: tall, so long pages
/// fit in one image.
pub const FAILURE_VIEWPORT: (u32, u32) = (1024, 2048);
/// Viewport restored after capture.
pub const DEFAULT_VIEWPORT: (u32, u32) = (1024, 768);

const COUNTER_FILE_SUFFIX: &str = ".counter";
const INDEX_FILE_NAME: &str = "screenshot-index.txt";

/// Destination for failure screenshots: a directory of images, a persisted
/// monotonic counter, and an append-only index mapping failures to public
/// URLs. Single-writer within a process.
#[derive(Debug)]
pub struct ArtifactSink {
    suite_class: String,
    run_id: String,
    output_dir: PathBuf,
    base_url: String,
    counter_file: PathBuf,
    index_file: PathBuf,
    counter: u64,
}

impl ArtifactSink {
    /// Open (or resume) the sink for one suite class. The counter picks up
    /// where a previous process left off.
    pub fn open(
        output_dir: impl Into<PathBuf>,
        base_url: &str,
        suite_class: &str,
        run_id: &str,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        let counter_file = output_dir.join(format!("{suite_class}{COUNTER_FILE_SUFFIX}"));
        let counter = match fs::read_to_string(&counter_file) {
            Ok(raw) => raw.trim().parse().unwrap_or(1),
            Err(_) => 1,
        };
        Ok(Self {
            suite_class: suite_class.to_owned(),
            run_id: run_id.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            index_file: output_dir.join(INDEX_FILE_NAME),
            output_dir,
            counter_file,
            counter,
        })
    }

    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    #[must_use]
    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    /// Capture one failure screenshot: resize tall, shoot, restore, bump
    /// and persist the counter, append the public URL to the index.
    /// Driver failures propagate unmodified.
    pub fn capture_failure(&mut self, driver: &mut dyn BrowserDriver) -> Result<PathBuf> {
        let file_name = format!(
            "{}-ERROR-{}-{}.jpg",
            self.suite_class, self.counter, self.run_id
        );
        let destination = self.output_dir.join(&file_name);

        driver.resize_viewport(FAILURE_VIEWPORT.0, FAILURE_VIEWPORT.1)?;
        driver.capture_screenshot(&destination)?;
        driver.resize_viewport(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1)?;

        self.counter += 1;
        fs::write(&self.counter_file, self.counter.to_string())?;

        let mut index = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.index_file)?;
        writeln!(index, "{}/{}", self.base_url, file_name)?;

        info!(path = %destination.display(), "captured failure screenshot");
        Ok(destination)
    }
}

/// Scans the diagnostic log after each test and raises on unsuppressed rows.
#[derive(Debug)]
pub struct DiagnosticCollector {
    filter: LogFilter,
    ignore: IgnoreMatcher,
}

impl DiagnosticCollector {
    /// Build from a suite's declared ignore prefixes, with the standard
    /// severity/channel filter.
    #[must_use]
    pub fn for_suite(hooks: &dyn SuiteHooks) -> Self {
        Self::new(LogFilter::harness_default(), IgnoreMatcher::compile(hooks.ignored_prefixes()))
    }

    #[must_use]
    pub fn new(filter: LogFilter, ignore: IgnoreMatcher) -> Self {
        Self { filter, ignore }
    }

    /// Run the full teardown check: evidence capture for failing
    /// browser-mode tests, then the log scan. The scan runs regardless of
    /// status or capture, so passing tests still fail on new log noise.
    pub fn run_teardown(
        &self,
        platform: &dyn Platform,
        status: TestStatus,
        browser: Option<(&mut dyn BrowserDriver, &mut ArtifactSink)>,
    ) -> Result<()> {
        if status.is_failing() {
            if let Some((driver, sink)) = browser {
                sink.capture_failure(driver)?;
            }
        }
        self.check(platform)
    }

    /// Scan the log. Rows are deduplicated by (message, variables) in
    /// first-seen order, rendered to bounded plain text, and compared
    /// against the ignore prefixes. Any remaining row is a finding.
    pub fn check(&self, platform: &dyn Platform) -> Result<()> {
        let rows = platform.query_diagnostics(&self.filter)?;

        let mut seen = BTreeSet::new();
        let mut findings = Vec::new();
        for row in &rows {
            if !self.filter.matches(row) {
                continue;
            }
            if !seen.insert(row.group_key()) {
                continue;
            }
            let message = render_row(row);
            if self.ignore.matches(&message) {
                debug!(message, "suppressed diagnostic row");
            } else {
                findings.push(message);
            }
        }

        if findings.is_empty() {
            Ok(())
        } else {
            Err(WarmbootError::DiagnosticFindings { findings })
        }
    }
}
