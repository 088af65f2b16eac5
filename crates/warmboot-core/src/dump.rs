//! Options for the platform's schema dump and migration runner.

use serde::{Deserialize, Serialize};

/// Table-name patterns whose *data* is excluded from a fast snapshot.
///
/// Schema is still dumped for these tables; their contents are volatile
/// (caches, sessions, the diagnostic log, scheduled-job logs) and would only
/// bloat the snapshot and leak state between runs.
pub const VOLATILE_TABLE_PATTERNS: [&str; 4] =
    ["cache.*", "sessions", "diagnostic_log", "scheduler_log"];

/// Per-statement insert batch size used outside CI. Conservative so the
/// generated dump imports across more local database configurations.
pub const LOCAL_INSERT_COUNT: u32 = 1_000;

/// Per-statement insert batch size used on CI, where throughput wins.
pub const CI_INSERT_COUNT: u32 = 100_000;

/// Options for a schema-oriented dump of the persistent store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDumpOptions {
    /// Patterns of tables dumped schema-only (no row data).
    pub schema_only_tables: Vec<String>,
    /// Rows per generated INSERT statement.
    pub insert_count: u32,
}

impl SchemaDumpOptions {
    /// The options the snapshot cache uses when regenerating a fast snapshot.
    #[must_use]
    pub fn for_snapshot(ci: bool) -> Self {
        Self {
            schema_only_tables: VOLATILE_TABLE_PATTERNS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            insert_count: if ci { CI_INSERT_COUNT } else { LOCAL_INSERT_COUNT },
        }
    }
}

/// Options for a migration-runner invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Whether the runner may prompt. The harness never allows this.
    pub interactive: bool,
    /// Whether the runner clears caches itself. Disabled for speed; the
    /// reconciler forces one full rebuild afterwards instead.
    pub clear_caches: bool,
}

impl MigrationOptions {
    /// The reconciler's fixed invocation: non-interactive, no cache clear.
    #[must_use]
    pub const fn non_interactive() -> Self {
        Self {
            interactive: false,
            clear_caches: false,
        }
    }
}
