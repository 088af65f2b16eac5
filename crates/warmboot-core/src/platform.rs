//! Capability traits the harness depends on.
//!
//! [`Platform`] is the application platform under test: its installer, dump
//! loader, migration runner, config importer, cache layer, and diagnostic
//! log, specified only at the interface boundary. [`SuiteHooks`] is the
//! contract a concrete test fixture fulfils. [`BrowserDriver`] is the
//! browser-automation seam used for failure screenshots.
//!
//! Every fallible operation returns the shared [`Result`]; collaborator
//! errors cross the boundary unmodified via
//! [`warmboot_error::WarmbootError::Collaborator`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warmboot_error::Result;

use crate::dump::{MigrationOptions, SchemaDumpOptions};
use crate::log::{DiagnosticRow, LogFilter};
use crate::settings::{DbConnectionInfo, SettingsEntry, SettingsWrite, SettingsWriteReport};

/// Result of a configuration import. Any error string makes the run fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigImportReport {
    /// Errors in the order the importer reported them.
    pub errors: Vec<String>,
}

impl ConfigImportReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The application platform under test.
///
/// One instance exists per process and is shared, single-threaded, across
/// every selected test method.
pub trait Platform {
    /// Name of the installation profile this environment runs.
    fn profile(&self) -> &str;

    /// The platform's own full installation procedure. The uncached
    /// baseline: succeeds or fails through the platform's own semantics.
    fn install_from_scratch(&mut self) -> Result<()>;

    /// Load a database dump (the path may point at a compressed file; the
    /// loader owns decompression).
    fn load_dump(&mut self, path: &Path) -> Result<()>;

    /// Persist a settings batch. Must happen before any dump load, because
    /// the dump's bootstrap code reads settings immediately.
    fn write_settings(&mut self, write: &SettingsWrite) -> Result<SettingsWriteReport>;

    /// The currently active database connection.
    fn connection_info(&self) -> DbConnectionInfo;

    /// Scratch directory for temporary files during bootstrap.
    fn temp_files_dir(&self) -> PathBuf;

    /// Produce a dump with the given schema-only exclusions and batch size.
    fn schema_dump(&mut self, options: &SchemaDumpOptions) -> Result<String>;

    /// Whether schema/data migrations are pending.
    fn pending_migrations(&self) -> Result<bool>;

    /// Whether structured post-update tasks are pending.
    fn pending_post_update_tasks(&self) -> Result<bool>;

    /// Run pending migrations. Failures propagate unmodified; the harness
    /// never retries.
    fn run_migrations(&mut self, options: &MigrationOptions) -> Result<()>;

    /// Force a full rebuild of internal caches. Migrations and config
    /// imports can alter cached metadata the harness itself depends on.
    fn rebuild_caches(&mut self) -> Result<()>;

    /// Whether unprocessed configuration changes exist.
    fn has_unprocessed_config_changes(&self) -> Result<bool>;

    /// Import pending configuration changes.
    fn import_config(&mut self) -> Result<ConfigImportReport>;

    /// Reset the well-known administrative account's password.
    fn reset_admin_password(&mut self, password: &str) -> Result<()>;

    /// Read diagnostic-log rows matching `filter`. Read-only.
    fn query_diagnostics(&self, filter: &LogFilter) -> Result<Vec<DiagnosticRow>>;
}

/// The contract a concrete test fixture supplies to the harness.
///
/// The required methods mirror what only the fixture can know: which
/// profile it expects, where its config lives, and which log messages are
/// expected noise. The hook methods default to no-ops.
pub trait SuiteHooks {
    /// Verify the environment runs the profile this suite was written for.
    fn check_profile(&self, profile: &str) -> Result<()>;

    /// Path to the config-sync directory persisted into settings.
    fn config_sync_path(&self) -> PathBuf;

    /// Path to the suite's source database dump, if it ships one. `None`
    /// defers to the platform's from-scratch installer.
    fn database_dump_path(&self) -> Option<PathBuf>;

    /// Extra settings entries to persist after install.
    fn additional_settings(&self) -> Vec<SettingsEntry> {
        Vec::new()
    }

    /// Runs before update detection, for setup the updates depend on.
    fn pre_reconcile(&mut self, platform: &mut dyn Platform) -> Result<()> {
        let _ = platform;
        Ok(())
    }

    /// Runs after both reconciliation checks, for environment-specific
    /// configuration.
    fn post_reconcile(&mut self, platform: &mut dyn Platform) -> Result<()> {
        let _ = platform;
        Ok(())
    }

    /// Runs after a successful config import, for post-deployment steps
    /// such as refreshing derived data.
    fn post_migration_step(&mut self, platform: &mut dyn Platform) -> Result<()> {
        let _ = platform;
        Ok(())
    }

    /// Literal message prefixes the diagnostic collector suppresses.
    /// Entries are never interpreted as regex.
    fn ignored_prefixes(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Browser-automation seam used for failure evidence capture.
pub trait BrowserDriver {
    fn resize_viewport(&mut self, width: u32, height: u32) -> Result<()>;

    /// Capture a screenshot of the current page to `destination`.
    /// Failures propagate unmodified.
    fn capture_screenshot(&mut self, destination: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_import_report_has_no_errors() {
        assert!(ConfigImportReport::default().is_clean());
        let dirty = ConfigImportReport {
            errors: vec!["missing dependency".to_owned()],
        };
        assert!(!dirty.is_clean());
    }
}
