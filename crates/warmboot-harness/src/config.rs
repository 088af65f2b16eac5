//! Process-wide harness configuration.
//!
//! Every environment-driven branch in the harness (CI batch sizing, the
//! skip-update-check fast path, the test filter, the snapshot template) is
//! resolved here exactly once at process start and threaded through the
//! components. Nothing re-reads the environment mid-run, so one process
//! behaves deterministically end to end.

/// Path template for the fast snapshot; may contain the revision token.
pub const FAST_SNAPSHOT_PATH_VAR: &str = "FAST_SNAPSHOT_PATH";
/// Boolean: skip pending-migration and config-import detection entirely.
pub const SKIP_UPDATE_CHECK_VAR: &str = "SKIP_UPDATE_CHECK";
/// Boolean: continuous-integration context; affects dump batch size.
pub const CI_VAR: &str = "CI";
/// Regex applied to candidate test-method names; unset matches everything.
pub const TEST_FILTER_VAR: &str = "TEST_FILTER";

/// Recognized environment configuration, resolved once per process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub fast_snapshot_path: Option<String>,
    pub skip_update_check: bool,
    pub ci: bool,
    pub test_filter: Option<String>,
}

impl HarnessConfig {
    /// Resolve from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve from an arbitrary lookup. Lets tests supply an environment
    /// without touching process globals.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            fast_snapshot_path: lookup(FAST_SNAPSHOT_PATH_VAR).filter(|v| !v.is_empty()),
            skip_update_check: truthy(lookup(SKIP_UPDATE_CHECK_VAR).as_deref()),
            ci: truthy(lookup(CI_VAR).as_deref()),
            test_filter: lookup(TEST_FILTER_VAR).filter(|v| !v.is_empty()),
        }
    }
}

/// Boolean env-flag semantics: set, non-empty, and not `0`/`false`.
fn truthy(value: Option<&str>) -> bool {
    match value {
        None | Some("") => false,
        Some(v) => v != "0" && !v.eq_ignore_ascii_case("false"),
    }
}
