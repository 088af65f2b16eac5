//! Platform-boundary types and capability traits for the warmboot harness.
//!
//! The harness control plane never assumes a concrete platform type. Every
//! external collaborator (the application platform under test, the concrete
//! test fixture, the browser-automation driver) is expressed here as a trait
//! plus the plain data types that cross the boundary. The harness crate
//! depends on these seams; fixtures and platform adapters implement them.

pub mod dump;
pub mod log;
pub mod platform;
pub mod settings;

pub use dump::{
    CI_INSERT_COUNT, LOCAL_INSERT_COUNT, MigrationOptions, SchemaDumpOptions,
    VOLATILE_TABLE_PATTERNS,
};
pub use log::{DiagnosticRow, LogFilter, RUNTIME_ERROR_CHANNEL, Severity};
pub use platform::{BrowserDriver, ConfigImportReport, Platform, SuiteHooks};
pub use settings::{
    DbConnectionInfo, SETTINGS_SCHEMA_VERSION, SettingsEntry, SettingsWrite, SettingsWriteReport,
};
