//! Bootstrap snapshot cache.
//!
//! Decides where the environment's initial database state comes from, in
//! precedence order: an existing fast snapshot (authoritative when present),
//! the suite's source dump, or the platform's own from-scratch installer.
//! When a fast-snapshot path is configured but absent, the cache is
//! self-healing: the first run on a new revision pays the full bootstrap
//! cost and then writes the snapshot for every later run.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use warmboot_core::{Platform, SchemaDumpOptions, SettingsEntry, SettingsWrite, SuiteHooks};
use warmboot_error::{Result, WarmbootError};

use crate::config::HarnessConfig;
use crate::secrets::random_salt;

/// Placeholder token in the snapshot path template, substituted with the
/// current short source-control revision.
pub const COMMIT_HASH_TOKEN: &str = "COMMIT-HASH";

/// Sentinel substituted when the revision cannot be resolved. Resolution
/// failure never fails the run.
pub const UNKNOWN_HASH: &str = "unknown-hash";

/// A resolved fast-snapshot location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDescriptor {
    pub path: PathBuf,
    /// Whether the file existed when the descriptor was resolved.
    pub exists: bool,
}

impl SnapshotDescriptor {
    /// Resolve a path template, substituting [`COMMIT_HASH_TOKEN`] via the
    /// supplied revision lookup. The lookup is injectable so tests do not
    /// need a git checkout.
    pub fn resolve_with(template: &str, revision: impl FnOnce() -> Option<String>) -> Self {
        let raw = if template.contains(COMMIT_HASH_TOKEN) {
            let rev = revision().unwrap_or_else(|| UNKNOWN_HASH.to_owned());
            template.replace(COMMIT_HASH_TOKEN, &rev)
        } else {
            template.to_owned()
        };
        let path = PathBuf::from(raw);
        let exists = path.exists();
        Self { path, exists }
    }

    /// Resolve a path template against the real version-control state.
    #[must_use]
    pub fn resolve(template: &str) -> Self {
        Self::resolve_with(template, short_revision)
    }
}

/// Short revision identifier of the current checkout, if resolvable.
#[must_use]
pub fn short_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let rev = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    (!rev.is_empty()).then_some(rev)
}

/// Where the bootstrap state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapSource {
    /// The fast snapshot existed and was loaded directly.
    Cache,
    /// The suite's source dump was loaded.
    SourceDump,
    /// The platform's own installer ran.
    FreshInstall,
}

/// Outcome of [`SnapshotCache::install`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapOutcome {
    pub source: BootstrapSource,
    /// Set when a fast-snapshot path was configured but missing: after
    /// reconciliation's update checks succeed, a snapshot should be
    /// generated here.
    pub regenerate_at: Option<PathBuf>,
}

impl BootstrapOutcome {
    #[must_use]
    pub fn used_cache(&self) -> bool {
        self.source == BootstrapSource::Cache
    }
}

/// The bootstrap snapshot cache. Resolves the snapshot descriptor once at
/// construction; consulted at most once per run.
#[derive(Debug)]
pub struct SnapshotCache {
    ci: bool,
    descriptor: Option<SnapshotDescriptor>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new(config: &HarnessConfig) -> Self {
        let descriptor = config
            .fast_snapshot_path
            .as_deref()
            .map(SnapshotDescriptor::resolve);
        Self {
            ci: config.ci,
            descriptor,
        }
    }

    /// Construct with a pre-resolved descriptor. Test seam: avoids the
    /// version-control lookup.
    #[must_use]
    pub fn with_descriptor(config: &HarnessConfig, descriptor: Option<SnapshotDescriptor>) -> Self {
        Self {
            ci: config.ci,
            descriptor,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<&SnapshotDescriptor> {
        self.descriptor.as_ref()
    }

    /// Bring up the environment from the best available source.
    ///
    /// Verifies the profile, picks the dump source, persists install
    /// settings, ensures the scratch directory exists, and loads the dump.
    /// When no dump is available at all, defers entirely to the platform's
    /// from-scratch installer.
    pub fn install(
        &self,
        platform: &mut dyn Platform,
        hooks: &mut dyn SuiteHooks,
    ) -> Result<BootstrapOutcome> {
        hooks.check_profile(platform.profile())?;

        let regenerate_at = self
            .descriptor
            .as_ref()
            .filter(|d| !d.exists)
            .map(|d| d.path.clone());

        let (source, dump_path) = match &self.descriptor {
            Some(descriptor) if descriptor.exists => {
                info!(path = %descriptor.path.display(), "loading cached fast snapshot");
                (BootstrapSource::Cache, descriptor.path.clone())
            }
            _ => match hooks.database_dump_path() {
                Some(path) => {
                    info!(path = %path.display(), "loading source dump");
                    (BootstrapSource::SourceDump, path)
                }
                None => {
                    info!("no dump configured; running full installation");
                    platform.install_from_scratch()?;
                    return Ok(BootstrapOutcome {
                        source: BootstrapSource::FreshInstall,
                        regenerate_at,
                    });
                }
            },
        };

        self.write_install_settings(platform, hooks)?;
        fs::create_dir_all(platform.temp_files_dir())?;
        platform.load_dump(&dump_path)?;

        Ok(BootstrapOutcome {
            source,
            regenerate_at,
        })
    }

    /// Persist the settings the dump's bootstrap code reads immediately:
    /// a fresh hash salt, the config-sync directory, and the active
    /// database connection. All three are required.
    fn write_install_settings(
        &self,
        platform: &mut dyn Platform,
        hooks: &dyn SuiteHooks,
    ) -> Result<()> {
        let connection = serde_json::to_value(platform.connection_info())
            .map_err(std::io::Error::other)?;
        let write = SettingsWrite::new(vec![
            SettingsEntry::required("hash_salt", json!(random_salt())),
            SettingsEntry::required(
                "config_sync_directory",
                json!(hooks.config_sync_path().to_string_lossy()),
            ),
            SettingsEntry::required("databases.default", connection),
        ]);
        write_checked(platform, &write)
    }

    /// Write the suite's additional settings, when it declares any.
    pub fn prepare_settings(
        &self,
        platform: &mut dyn Platform,
        hooks: &dyn SuiteHooks,
    ) -> Result<()> {
        let entries = hooks.additional_settings();
        if entries.is_empty() {
            return Ok(());
        }
        write_checked(platform, &SettingsWrite::new(entries))
    }

    /// Generate the fast snapshot at `path`: a schema-oriented dump that
    /// excludes volatile table data, persisted atomically (temp file plus
    /// rename) so a crashed run never leaves a half-written snapshot.
    pub fn generate_snapshot(&self, platform: &mut dyn Platform, path: &Path) -> Result<()> {
        let options = SchemaDumpOptions::for_snapshot(self.ci);
        debug!(insert_count = options.insert_count, "dumping schema for fast snapshot");
        let dump = platform.schema_dump(&options)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file_name = path
            .file_name()
            .map_or_else(|| "snapshot".to_owned(), |n| n.to_string_lossy().into_owned());
        let staging = path.with_file_name(format!("{file_name}.tmp"));
        fs::write(&staging, dump)?;
        fs::rename(&staging, path)?;
        info!(path = %path.display(), "wrote fast snapshot");
        Ok(())
    }
}

/// Run a settings write and fail if any required key was not persisted.
fn write_checked(platform: &mut dyn Platform, write: &SettingsWrite) -> Result<()> {
    let report = platform.write_settings(write)?;
    if report.covers_required(write) {
        return Ok(());
    }
    let missing = write
        .entries
        .iter()
        .filter(|e| e.required && !report.written.contains(&e.key))
        .map(|e| e.key.clone())
        .collect();
    Err(WarmbootError::SettingsWrite { missing })
}
