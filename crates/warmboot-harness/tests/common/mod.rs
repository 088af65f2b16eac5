//! In-memory fakes for the platform boundary, shared by the integration
//! suites. A shared event ledger records call order across the platform
//! and the suite hooks.

// Each integration binary uses a different subset of the fakes.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use warmboot_core::{
    BrowserDriver, ConfigImportReport, DbConnectionInfo, DiagnosticRow, LogFilter,
    MigrationOptions, Platform, SchemaDumpOptions, SettingsEntry, SettingsWrite,
    SettingsWriteReport, SuiteHooks,
};
use warmboot_error::{Result, WarmbootError};

pub type Ledger = Rc<RefCell<Vec<String>>>;

pub fn new_ledger() -> Ledger {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct FakePlatform {
    pub ledger: Ledger,
    pub profile: String,
    pub temp_dir: PathBuf,
    pub pending_migrations: bool,
    pub pending_post_update_tasks: bool,
    pub unprocessed_config_changes: bool,
    pub import_report: ConfigImportReport,
    pub dump_contents: String,
    pub log_rows: Vec<DiagnosticRow>,
    /// Required settings key the platform pretends it cannot persist.
    pub refuse_setting: Option<String>,

    pub settings_writes: Vec<SettingsWrite>,
    pub loaded_dumps: Vec<PathBuf>,
    pub fresh_installs: u32,
    pub migrations_run: Vec<MigrationOptions>,
    pub cache_rebuilds: u32,
    pub schema_dumps: Vec<SchemaDumpOptions>,
    pub admin_passwords: Vec<String>,
}

impl FakePlatform {
    pub fn new(ledger: Ledger, temp_dir: PathBuf) -> Self {
        Self {
            ledger,
            profile: "standard".to_owned(),
            temp_dir,
            pending_migrations: false,
            pending_post_update_tasks: false,
            unprocessed_config_changes: false,
            import_report: ConfigImportReport::default(),
            dump_contents: "-- schema dump\n".to_owned(),
            log_rows: Vec::new(),
            refuse_setting: None,
            settings_writes: Vec::new(),
            loaded_dumps: Vec::new(),
            fresh_installs: 0,
            migrations_run: Vec::new(),
            cache_rebuilds: 0,
            schema_dumps: Vec::new(),
            admin_passwords: Vec::new(),
        }
    }

    fn record(&self, event: &str) {
        self.ledger.borrow_mut().push(event.to_owned());
    }
}

impl Platform for FakePlatform {
    fn profile(&self) -> &str {
        &self.profile
    }

    fn install_from_scratch(&mut self) -> Result<()> {
        self.record("install_from_scratch");
        self.fresh_installs += 1;
        Ok(())
    }

    fn load_dump(&mut self, path: &Path) -> Result<()> {
        self.record("load_dump");
        self.loaded_dumps.push(path.to_path_buf());
        Ok(())
    }

    fn write_settings(&mut self, write: &SettingsWrite) -> Result<SettingsWriteReport> {
        self.record("write_settings");
        self.settings_writes.push(write.clone());
        let mut report = SettingsWriteReport::default();
        for entry in &write.entries {
            if self.refuse_setting.as_deref() == Some(entry.key.as_str()) {
                report.skipped.push(entry.key.clone());
            } else {
                report.written.push(entry.key.clone());
            }
        }
        Ok(report)
    }

    fn connection_info(&self) -> DbConnectionInfo {
        DbConnectionInfo {
            driver: "pgsql".to_owned(),
            database: "app_test".to_owned(),
            host: "localhost".to_owned(),
            port: 5432,
            username: "app".to_owned(),
            password: None,
            prefix: String::new(),
        }
    }

    fn temp_files_dir(&self) -> PathBuf {
        self.temp_dir.clone()
    }

    fn schema_dump(&mut self, options: &SchemaDumpOptions) -> Result<String> {
        self.record("schema_dump");
        self.schema_dumps.push(options.clone());
        Ok(self.dump_contents.clone())
    }

    fn pending_migrations(&self) -> Result<bool> {
        self.record("pending_migrations");
        Ok(self.pending_migrations)
    }

    fn pending_post_update_tasks(&self) -> Result<bool> {
        Ok(self.pending_post_update_tasks)
    }

    fn run_migrations(&mut self, options: &MigrationOptions) -> Result<()> {
        self.record("run_migrations");
        self.migrations_run.push(*options);
        self.pending_migrations = false;
        self.pending_post_update_tasks = false;
        Ok(())
    }

    fn rebuild_caches(&mut self) -> Result<()> {
        self.record("rebuild_caches");
        self.cache_rebuilds += 1;
        Ok(())
    }

    fn has_unprocessed_config_changes(&self) -> Result<bool> {
        Ok(self.unprocessed_config_changes)
    }

    fn import_config(&mut self) -> Result<ConfigImportReport> {
        self.record("import_config");
        self.unprocessed_config_changes = false;
        Ok(self.import_report.clone())
    }

    fn reset_admin_password(&mut self, password: &str) -> Result<()> {
        self.record("reset_admin_password");
        self.admin_passwords.push(password.to_owned());
        Ok(())
    }

    fn query_diagnostics(&self, filter: &LogFilter) -> Result<Vec<DiagnosticRow>> {
        Ok(self
            .log_rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }
}

pub struct FakeHooks {
    pub ledger: Ledger,
    pub expected_profile: String,
    pub config_sync: PathBuf,
    pub dump_path: Option<PathBuf>,
    pub additional: Vec<SettingsEntry>,
    pub ignored: Vec<String>,
}

impl FakeHooks {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            expected_profile: "standard".to_owned(),
            config_sync: PathBuf::from("/project/config/sync"),
            dump_path: None,
            additional: Vec::new(),
            ignored: Vec::new(),
        }
    }

    fn record(&self, event: &str) {
        self.ledger.borrow_mut().push(event.to_owned());
    }
}

impl SuiteHooks for FakeHooks {
    fn check_profile(&self, profile: &str) -> Result<()> {
        self.record("check_profile");
        if profile == self.expected_profile {
            Ok(())
        } else {
            Err(WarmbootError::collaborator(std::io::Error::other(format!(
                "expected profile {}, environment runs {profile}",
                self.expected_profile
            ))))
        }
    }

    fn config_sync_path(&self) -> PathBuf {
        self.config_sync.clone()
    }

    fn database_dump_path(&self) -> Option<PathBuf> {
        self.dump_path.clone()
    }

    fn additional_settings(&self) -> Vec<SettingsEntry> {
        self.additional.clone()
    }

    fn pre_reconcile(&mut self, _platform: &mut dyn Platform) -> Result<()> {
        self.record("pre_reconcile");
        Ok(())
    }

    fn post_reconcile(&mut self, _platform: &mut dyn Platform) -> Result<()> {
        self.record("post_reconcile");
        Ok(())
    }

    fn post_migration_step(&mut self, _platform: &mut dyn Platform) -> Result<()> {
        self.record("post_migration_step");
        Ok(())
    }

    fn ignored_prefixes(&self) -> Vec<String> {
        self.ignored.clone()
    }
}

#[derive(Default)]
pub struct FakeDriver {
    pub resizes: Vec<(u32, u32)>,
    pub screenshots: Vec<PathBuf>,
}

impl BrowserDriver for FakeDriver {
    fn resize_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.resizes.push((width, height));
        Ok(())
    }

    fn capture_screenshot(&mut self, destination: &Path) -> Result<()> {
        std::fs::write(destination, b"jpg")?;
        self.screenshots.push(destination.to_path_buf());
        Ok(())
    }
}

/// Position of `event` in the ledger; panics when absent.
pub fn position(ledger: &Ledger, event: &str) -> usize {
    ledger
        .borrow()
        .iter()
        .position(|e| e == event)
        .unwrap_or_else(|| panic!("event {event} never recorded: {:?}", ledger.borrow()))
}
