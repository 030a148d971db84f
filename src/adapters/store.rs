//! In-memory settings and config store.
//!
//! Implements both [`SettingsStore`] and [`ConfigPort`] for the host build.
//!
//! - Settings are kept as strings under a namespaced key, the way a
//!   platform settings provider stores them; integers are parsed on read.
//! - Every successful settings write posts `ControlMsg::SettingsChanged`
//!   to the attached inbox, so the panel learns about its own writes the
//!   same way it learns about anyone else's.
//! - The config is stored as a `postcard` blob and validated before it is
//!   persisted.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::app::ports::{ConfigError, ConfigPort, SettingsStore, StorageError};
use crate::config::PanelConfig;
use crate::events::{ControlMsg, Inbox, SettingKey};

const SETTINGS_NAMESPACE: &str = "system";
const CONFIG_NAMESPACE: &str = "quickpanel";
const CONFIG_KEY: &str = "panelcfg";

const MAX_BLOB_SIZE: usize = 1024;

pub struct MemoryStore {
    settings: HashMap<String, String>,
    blobs: RefCell<HashMap<String, Vec<u8>>>,
    inbox: Option<Arc<Inbox>>,
    read_only: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A detached store: writes succeed but notify nobody.
    pub fn new() -> Self {
        Self {
            settings: HashMap::new(),
            blobs: RefCell::new(HashMap::new()),
            inbox: None,
            read_only: false,
        }
    }

    /// A store that reports every settings write to `inbox`.
    pub fn with_inbox(inbox: Arc<Inbox>) -> Self {
        Self {
            inbox: Some(inbox),
            ..Self::new()
        }
    }

    /// Reject every settings write from now on.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Seed a value without posting a change notification.
    pub fn seed(&mut self, key: SettingKey, value: &str) {
        self.settings.insert(Self::composite_key(key), String::from(value));
    }

    fn composite_key(key: SettingKey) -> String {
        format!("{}::{}", SETTINGS_NAMESPACE, key.name())
    }

    fn blob_key() -> String {
        format!("{}::{}", CONFIG_NAMESPACE, CONFIG_KEY)
    }

    fn write(&mut self, key: SettingKey, value: String) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Rejected);
        }
        let k = Self::composite_key(key);
        if self.settings.get(&k) == Some(&value) {
            // Unchanged values do not notify.
            return Ok(());
        }
        debug!("store: {} = {}", key.name(), value);
        self.settings.insert(k, value);
        if let Some(inbox) = &self.inbox {
            inbox.post(ControlMsg::SettingsChanged { key });
        }
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn get_string(&self, key: SettingKey) -> Option<String> {
        self.settings.get(&Self::composite_key(key)).cloned()
    }

    fn put_string(&mut self, key: SettingKey, value: &str) -> Result<(), StorageError> {
        self.write(key, String::from(value))
    }

    fn get_int(&self, key: SettingKey) -> Option<i32> {
        self.settings
            .get(&Self::composite_key(key))
            .and_then(|v| v.trim().parse().ok())
    }

    fn put_int(&mut self, key: SettingKey, value: i32) -> Result<(), StorageError> {
        self.write(key, value.to_string())
    }
}

/// Range checks applied before a config is persisted.
pub fn validate_config(cfg: &PanelConfig) -> Result<(), ConfigError> {
    if !(1..=60).contains(&cfg.confirm_window_ticks) {
        return Err(ConfigError::ValidationFailed("confirm_window_ticks must be 1-60"));
    }
    if !(10..=5_000).contains(&cfg.tick_interval_ms) {
        return Err(ConfigError::ValidationFailed("tick_interval_ms must be 10-5000"));
    }
    if !(1_000..=600_000).contains(&cfg.record_auto_stop_ms) {
        return Err(ConfigError::ValidationFailed("record_auto_stop_ms must be 1000-600000"));
    }
    if cfg.record_revert_ms == 0 || cfg.record_revert_ms >= cfg.record_auto_stop_ms {
        return Err(ConfigError::ValidationFailed(
            "record_revert_ms must be non-zero and < record_auto_stop_ms",
        ));
    }
    if cfg.quick_record_path.is_empty() {
        return Err(ConfigError::ValidationFailed("quick_record_path must not be empty"));
    }
    if !(10..=1_000).contains(&cfg.torch_confirm_interval_ms) {
        return Err(ConfigError::ValidationFailed("torch_confirm_interval_ms must be 10-1000"));
    }
    if cfg.torch_confirm_attempts == 0 {
        return Err(ConfigError::ValidationFailed("torch_confirm_attempts must be non-zero"));
    }
    if !(1..=6).contains(&cfg.default_columns) {
        return Err(ConfigError::ValidationFailed("default_columns must be 1-6"));
    }
    Ok(())
}

impl ConfigPort for MemoryStore {
    fn load(&self) -> Result<PanelConfig, ConfigError> {
        match self.blobs.borrow().get(&Self::blob_key()) {
            Some(bytes) => {
                let cfg: PanelConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("store: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("store: no stored config, using defaults");
                Ok(PanelConfig::default())
            }
        }
    }

    fn save(&self, config: &PanelConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::IoError);
        }
        info!("store: saved config ({} bytes)", bytes.len());
        self.blobs.borrow_mut().insert(Self::blob_key(), bytes);
        Ok(())
    }
}
