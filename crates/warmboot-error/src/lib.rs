//! Shared error type for the warmboot test-harness control plane.
//!
//! One enum covers every fatal condition the harness can raise itself;
//! collaborator failures (migration runner, browser driver, platform I/O)
//! pass through the [`WarmbootError::Collaborator`] variant unmodified so
//! their own messages survive intact. There is no retry machinery anywhere:
//! each fatal condition surfaces once, deterministically.

use thiserror::Error;

/// Boxed collaborator error, preserved verbatim.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Primary error type for harness operations.
#[derive(Error, Debug)]
pub enum WarmbootError {
    // === Reconciliation ===
    /// Configuration import reported one or more errors. Unrecoverable: an
    /// inconsistent configuration state invalidates every subsequent test.
    #[error("there were errors importing the configuration\n{}", .errors.join("\n"))]
    ConfigImport { errors: Vec<String> },

    // === Selection ===
    /// No test method matched both the naming convention and the filter
    /// pattern. Treated as harness misconfiguration, never a silent pass.
    #[error(
        "no tests run from {suite}: no methods begin with \"do_test\" and match the pattern: {pattern}"
    )]
    NoTestsSelected { suite: String, pattern: String },

    // === Teardown ===
    /// Unsuppressed diagnostic-log rows were found after a test.
    #[error(
        "errors found in the diagnostic log; if they are expected add their \
         prefix to SuiteHooks::ignored_prefixes()\n\n{}",
        bullet_list(.findings)
    )]
    DiagnosticFindings { findings: Vec<String> },

    // === Bootstrap ===
    /// The platform acknowledged a settings write but left required keys
    /// unwritten. The dump's bootstrap code would read stale settings.
    #[error("platform failed to persist required settings: {}", .missing.join(", "))]
    SettingsWrite { missing: Vec<String> },

    // === Configuration ===
    /// The TEST_FILTER environment variable did not compile as a regex.
    #[error("invalid TEST_FILTER pattern: {0}")]
    Filter(#[from] regex::Error),

    // === Passthrough ===
    /// File I/O error (snapshot persistence, counter/index files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collaborator failed; the error is propagated unmodified.
    #[error(transparent)]
    Collaborator(CollaboratorError),
}

impl WarmbootError {
    /// Wrap a collaborator failure without altering its message.
    pub fn collaborator(err: impl Into<CollaboratorError>) -> Self {
        Self::Collaborator(err.into())
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, WarmbootError>;

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
