//! Warmboot test-harness control plane.
//!
//! Makes repeated full-stack test runs fast and trustworthy:
//!
//! - the **bootstrap snapshot cache** ([`snapshot`]) reuses or regenerates
//!   an expensive bootstrap dump instead of reinstalling every run;
//! - the **environment reconciler** ([`reconcile`]) brings the loaded state
//!   up to the current codebase (pending migrations, pending configuration
//!   changes) and aborts on unrecoverable import errors;
//! - the **selective test executor** ([`combiner`]) runs a filtered subset
//!   of a suite's cases inside the one shared bootstrap;
//! - the **diagnostic collector** ([`teardown`]) turns unsuppressed
//!   diagnostic-log rows and visual failures into hard test failures with
//!   captured evidence.
//!
//! Everything is single-threaded and strictly ordered: snapshot resolution,
//! reconciliation, test methods in declared order, per-test collection.
//! [`bootstrap`] wires the once-per-process part of that sequence together.

pub mod combiner;
pub mod config;
pub mod ignore;
pub mod reconcile;
pub mod render;
pub mod secrets;
pub mod snapshot;
pub mod teardown;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use warmboot_core::{Platform, SuiteHooks};
use warmboot_error::Result;

pub use combiner::{CombinedSuite, SelectionReport, TestFilter, TestMethod, run_selected};
pub use config::HarnessConfig;
pub use ignore::IgnoreMatcher;
pub use reconcile::{ReconciliationOutcome, Reconciler};
pub use snapshot::{BootstrapOutcome, BootstrapSource, SnapshotCache, SnapshotDescriptor};
pub use teardown::{ArtifactSink, DiagnosticCollector, TestStatus};

/// What one full bootstrap pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    pub source: BootstrapSource,
    /// Path of the fast snapshot written during this run, if any.
    pub generated_snapshot: Option<PathBuf>,
    pub reconciliation: ReconciliationOutcome,
}

/// Stand up the shared environment: install from the best source, apply
/// pending updates, regenerate the fast snapshot when configured-but-missing,
/// then finalize with the post hook and a fresh admin login.
///
/// Runs once per process, before any test method.
pub fn bootstrap(
    config: &HarnessConfig,
    platform: &mut dyn Platform,
    hooks: &mut dyn SuiteHooks,
) -> Result<BootstrapReport> {
    bootstrap_with_cache(&SnapshotCache::new(config), config, platform, hooks)
}

/// [`bootstrap`] with a caller-built cache, so tests can inject a resolved
/// snapshot descriptor.
pub fn bootstrap_with_cache(
    cache: &SnapshotCache,
    config: &HarnessConfig,
    platform: &mut dyn Platform,
    hooks: &mut dyn SuiteHooks,
) -> Result<BootstrapReport> {
    let outcome = cache.install(platform, hooks)?;
    cache.prepare_settings(platform, hooks)?;

    let reconciler = Reconciler::new(config);
    let summary = reconciler.apply_updates(platform, hooks)?;

    // Snapshot generation sits between the update checks and finalization:
    // the dump must contain the migrated, imported state, but not the
    // per-run admin credentials.
    let generated_snapshot = match &outcome.regenerate_at {
        Some(path) => {
            cache.generate_snapshot(platform, path)?;
            Some(path.clone())
        }
        None => None,
    };

    let admin_password = reconciler.finalize(platform, hooks)?;

    Ok(BootstrapReport {
        source: outcome.source,
        generated_snapshot,
        reconciliation: ReconciliationOutcome {
            ran_migrations: summary.ran_migrations,
            imported_config: summary.imported_config,
            admin_password,
        },
    })
}
