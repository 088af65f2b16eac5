//! Environment reconciler.
//!
//! Runs once per process after the snapshot (cached or fresh) is in place
//! and before any test method: applies pending migrations and configuration
//! changes, then hands the environment over with a known-good admin login.
//!
//! The migration check and the config-import check are independent; either,
//! both, or neither can fire in one run. Only configuration-import errors
//! are fatal here; migration-runner failures propagate from the platform
//! unmodified.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use warmboot_core::{MigrationOptions, Platform, SuiteHooks};
use warmboot_error::{Result, WarmbootError};

use crate::config::HarnessConfig;
use crate::secrets::random_password;

/// What the update checks did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub ran_migrations: bool,
    pub imported_config: bool,
}

/// Result of a full reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    pub ran_migrations: bool,
    pub imported_config: bool,
    /// Freshly generated password for the administrative account, so every
    /// run has a working privileged login regardless of snapshot contents.
    pub admin_password: String,
}

/// Brings a loaded snapshot up to the current codebase's expectations.
#[derive(Debug)]
pub struct Reconciler {
    skip_update_check: bool,
}

impl Reconciler {
    #[must_use]
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            skip_update_check: config.skip_update_check,
        }
    }

    /// Full reconciliation: update checks followed by finalization.
    pub fn reconcile(
        &self,
        platform: &mut dyn Platform,
        hooks: &mut dyn SuiteHooks,
    ) -> Result<ReconciliationOutcome> {
        let summary = self.apply_updates(platform, hooks)?;
        let admin_password = self.finalize(platform, hooks)?;
        Ok(ReconciliationOutcome {
            ran_migrations: summary.ran_migrations,
            imported_config: summary.imported_config,
            admin_password,
        })
    }

    /// Pre-hook, then pending-migration and config-import detection.
    ///
    /// Skipped entirely (after the pre-hook) when the skip-update-check
    /// flag is set, for CI runs that already know nothing is pending.
    pub fn apply_updates(
        &self,
        platform: &mut dyn Platform,
        hooks: &mut dyn SuiteHooks,
    ) -> Result<UpdateSummary> {
        hooks.pre_reconcile(platform)?;

        let mut summary = UpdateSummary::default();
        if self.skip_update_check {
            debug!("skip-update-check set; not checking migrations or config");
            return Ok(summary);
        }

        let has_updates =
            platform.pending_migrations()? || platform.pending_post_update_tasks()?;
        if has_updates {
            info!("pending updates detected; running migration runner");
            platform.run_migrations(&MigrationOptions::non_interactive())?;
            // Migrations can alter cached metadata the harness depends on.
            platform.rebuild_caches()?;
            summary.ran_migrations = true;
        }

        if platform.has_unprocessed_config_changes()? {
            info!("unprocessed configuration changes detected; importing");
            let report = platform.import_config()?;
            if !report.is_clean() {
                return Err(WarmbootError::ConfigImport {
                    errors: report.errors,
                });
            }
            platform.rebuild_caches()?;
            hooks.post_migration_step(platform)?;
            summary.imported_config = true;
        }

        Ok(summary)
    }

    /// Post-hook, then reset the admin account to a fresh random password.
    /// Returns the password.
    pub fn finalize(
        &self,
        platform: &mut dyn Platform,
        hooks: &mut dyn SuiteHooks,
    ) -> Result<String> {
        hooks.post_reconcile(platform)?;
        let password = random_password();
        platform.reset_admin_password(&password)?;
        Ok(password)
    }
}
