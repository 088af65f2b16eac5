//! Diagnostic-log row model and the query filter the collector uses.
//!
//! The platform's internal diagnostic log is a structured record of runtime
//! errors, warnings, and notices. The harness only ever reads it; rows are
//! returned through [`crate::Platform::query_diagnostics`] with a
//! [`LogFilter`] describing which rows qualify.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Channel name the platform assigns to rows originating from its
/// runtime-error handler. Rows on this channel qualify as findings
/// regardless of severity.
pub const RUNTIME_ERROR_CHANNEL: &str = "runtime";

/// RFC 5424 severity levels, numerically ordered: lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    /// Numeric level (0 = emergency .. 7 = debug).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Alert => 1,
            Self::Critical => 2,
            Self::Error => 3,
            Self::Warning => 4,
            Self::Notice => 5,
            Self::Info => 6,
            Self::Debug => 7,
        }
    }

    /// Parse a numeric level back into a severity.
    #[must_use]
    pub const fn from_u8(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// One row of the platform's diagnostic log.
///
/// `message` is a template; `variables` maps placeholder tokens inside the
/// template to their substitution values. Two rows with the same message and
/// variables describe the same repeated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRow {
    pub message: String,
    pub variables: BTreeMap<String, String>,
    pub severity: Severity,
    pub channel: String,
}

impl DiagnosticRow {
    #[must_use]
    pub fn new(severity: Severity, channel: &str, message: &str) -> Self {
        Self {
            message: message.to_owned(),
            variables: BTreeMap::new(),
            severity,
            channel: channel.to_owned(),
        }
    }

    /// Attach a placeholder substitution (fluent builder).
    #[must_use]
    pub fn with_variable(mut self, token: &str, value: &str) -> Self {
        self.variables.insert(token.to_owned(), value.to_owned());
        self
    }

    /// Grouping key: rows with equal keys report as one finding.
    #[must_use]
    pub fn group_key(&self) -> (String, Vec<(String, String)>) {
        (
            self.message.clone(),
            self.variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// Row qualification predicate for the teardown scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Rows with a numeric severity strictly below this level qualify.
    pub severity_below: u8,
    /// Rows on this channel qualify regardless of severity.
    pub channel: String,
}

impl LogFilter {
    /// The filter the diagnostic collector uses: anything strictly more
    /// severe than a warning, or anything from the runtime-error channel.
    #[must_use]
    pub fn harness_default() -> Self {
        Self {
            severity_below: Severity::Warning.as_u8(),
            channel: RUNTIME_ERROR_CHANNEL.to_owned(),
        }
    }

    #[must_use]
    pub fn matches(&self, row: &DiagnosticRow) -> bool {
        row.severity.as_u8() < self.severity_below || row.channel == self.channel
    }
}
