//! Selective test executor.
//!
//! A suite declares its logical test cases as named methods following the
//! `do_test` convention; all selected cases run sequentially inside the one
//! shared bootstrap instead of each standing up its own environment. That
//! sharing is the performance point of the whole harness. `TEST_FILTER`
//! narrows the selection; matching nothing is a misconfiguration, never a
//! silent green run.

use regex::Regex;
use serde::Serialize;
use tracing::debug;
use warmboot_error::{Result, WarmbootError};

use crate::config::HarnessConfig;

/// Naming-convention marker, matched case-insensitively at the start of a
/// method name.
pub const TEST_METHOD_PREFIX: &str = "do_test";

/// One named test method on a suite.
pub struct TestMethod<S> {
    pub name: &'static str,
    pub run: fn(&mut S) -> Result<()>,
}

impl<S> TestMethod<S> {
    #[must_use]
    pub const fn new(name: &'static str, run: fn(&mut S) -> Result<()>) -> Self {
        Self { name, run }
    }

    /// Whether the name follows the `do_test` convention.
    #[must_use]
    pub fn is_conventional(&self) -> bool {
        self.name
            .get(..TEST_METHOD_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(TEST_METHOD_PREFIX))
    }
}

/// A suite of combined test cases sharing one bootstrap.
///
/// `test_methods` returns the cases in declared order; execution preserves
/// that order.
pub trait CombinedSuite: Sized {
    fn suite_name() -> &'static str;
    fn test_methods() -> Vec<TestMethod<Self>>;
}

/// Compiled method-name filter from `TEST_FILTER`.
///
/// Applied as a substring regex test against candidate names; unset
/// matches everything.
#[derive(Debug, Clone)]
pub struct TestFilter {
    pattern: String,
    regex: Regex,
}

impl TestFilter {
    /// Compile from the resolved configuration. An invalid pattern is a
    /// hard error, not a silent match-all.
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let pattern = config
            .test_filter
            .clone()
            .unwrap_or_else(|| ".*".to_owned());
        let regex = Regex::new(&pattern)?;
        Ok(Self { pattern, regex })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn is_match(&self, method_name: &str) -> bool {
        self.regex.is_match(method_name)
    }
}

/// Which methods ran and which were skipped, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionReport {
    pub executed: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Run every suite method matching the naming convention and the filter,
/// sequentially, in declared order.
///
/// # Errors
///
/// Returns [`WarmbootError::NoTestsSelected`] when nothing ran, and
/// propagates the first failing method's error.
pub fn run_selected<S: CombinedSuite>(suite: &mut S, filter: &TestFilter) -> Result<SelectionReport> {
    let mut executed = Vec::new();
    let mut skipped = Vec::new();

    for method in S::test_methods() {
        if method.is_conventional() && filter.is_match(method.name) {
            debug!(method = method.name, "running combined test case");
            (method.run)(suite)?;
            executed.push(method.name);
        } else {
            skipped.push(method.name);
        }
    }

    if executed.is_empty() {
        return Err(WarmbootError::NoTestsSelected {
            suite: S::suite_name().to_owned(),
            pattern: filter.pattern().to_owned(),
        });
    }
    Ok(SelectionReport { executed, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_for(pattern: Option<&str>) -> TestFilter {
        let config = HarnessConfig {
            test_filter: pattern.map(str::to_owned),
            ..HarnessConfig::default()
        };
        TestFilter::from_config(&config).unwrap()
    }

    #[test]
    fn unset_filter_matches_everything() {
        let filter = filter_for(None);
        assert_eq!(filter.pattern(), ".*");
        assert!(filter.is_match("do_test_anything"));
    }

    #[test]
    fn filter_is_a_substring_match() {
        let filter = filter_for(Some("checkout"));
        assert!(filter.is_match("do_test_checkout_flow"));
        assert!(!filter.is_match("do_test_login"));
    }

    #[test]
    fn invalid_filter_pattern_is_an_error() {
        let config = HarnessConfig {
            test_filter: Some("(unclosed".to_owned()),
            ..HarnessConfig::default()
        };
        assert!(matches!(
            TestFilter::from_config(&config),
            Err(WarmbootError::Filter(_))
        ));
    }

    #[test]
    fn convention_marker_is_case_insensitive() {
        let lower: TestMethod<()> = TestMethod::new("do_test_a", |_| Ok(()));
        let upper: TestMethod<()> = TestMethod::new("Do_Test_b", |_| Ok(()));
        let helper: TestMethod<()> = TestMethod::new("helper_x", |_| Ok(()));
        assert!(lower.is_conventional());
        assert!(upper.is_conventional());
        assert!(!helper.is_conventional());
    }
}
