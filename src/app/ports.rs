//! Port traits: the hexagonal boundary between panel logic and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ QuickPanel (domain)
//! ```
//!
//! Driven adapters (settings store, radio APIs, camera, recorder, shell,
//! background workers, event sinks) implement these traits.  The
//! [`QuickPanel`](super::service::QuickPanel) consumes them via generics, so
//! the core never touches a platform API directly.
//!
//! ## Notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **BackgroundPort** work runs off the control thread; results come back
//!   only as [`ControlMsg`](crate::events::ControlMsg)s through the inbox.

use crate::config::PanelConfig;
use crate::error::{ActionError, HardwareError};
use crate::events::SettingKey;
use crate::registry::ToggleKind;
use crate::tiles::{ExternalValue, RingerMode};

// ───────────────────────────────────────────────────────────────
// Settings store (driven adapter: domain ↔ key-value settings)
// ───────────────────────────────────────────────────────────────

/// Key-value settings with change notification.
///
/// Writes are expected to produce a `ControlMsg::SettingsChanged` for the
/// key; the panel reacts to that message, not to its own write.
pub trait SettingsStore {
    fn get_string(&self, key: SettingKey) -> Option<String>;

    fn put_string(&mut self, key: SettingKey, value: &str) -> Result<(), StorageError>;

    fn get_int(&self, key: SettingKey) -> Option<i32>;

    fn put_int(&mut self, key: SettingKey, value: i32) -> Result<(), StorageError>;

    /// Integer setting read as a flag (non-zero is `true`).
    fn get_bool(&self, key: SettingKey) -> Option<bool> {
        self.get_int(key).map(|v| v != 0)
    }

    fn put_bool(&mut self, key: SettingKey, value: bool) -> Result<(), StorageError> {
        self.put_int(key, i32::from(value))
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists panel configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`PanelConfig::default()`] if none is stored.
    fn load(&self) -> Result<PanelConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &PanelConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Action port (driven adapter: domain → platform services)
// ───────────────────────────────────────────────────────────────

/// Commands with no direct API, delivered as broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastCommand {
    ToggleVibrate,
    ToggleSilent,
    RebootMenu,
}

/// A request to change platform state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    SetWifi(bool),
    SetWifiAp(bool),
    SetBluetooth(bool),
    SetNfc(bool),
    SetUsbTether(bool),
    SetMasterSync(bool),
    SetGps(bool),
    /// `true` locks rotation.
    SetRotationLock(bool),
    SetAirplaneMode(bool),
    SetMobileData(bool),
    /// Restrict the radio to 2G only.
    SetTwoGOnly(bool),
    /// Allow LTE in the preferred network mode.
    SetLte(bool),
    SetRingerMode(RingerMode),
    Broadcast(BroadcastCommand),
}

/// Platform services the panel drives on user action.
pub trait ActionPort {
    fn perform(&mut self, action: PanelAction) -> Result<(), ActionError>;
}

// ───────────────────────────────────────────────────────────────
// State poller (driven adapter: platform → domain, pull)
// ───────────────────────────────────────────────────────────────

/// Best-effort read of a toggle's current state from its subsystem.
pub trait StatePoller {
    /// `None` if the subsystem cannot say right now.
    fn poll(&mut self, kind: ToggleKind) -> Option<ExternalValue>;
}

// ───────────────────────────────────────────────────────────────
// Torch hardware
// ───────────────────────────────────────────────────────────────

/// Camera with a flash usable as a torch.
pub trait CameraPort {
    fn open_camera(&mut self) -> Result<(), HardwareError>;

    fn start_preview(&mut self) -> Result<(), HardwareError>;

    /// `true` selects torch mode, `false` turns the flash off.
    fn set_flash(&mut self, on: bool) -> Result<(), HardwareError>;

    /// Whether the preview surface is up and the flash actually lit.
    fn preview_ready(&mut self) -> bool;

    fn stop_preview(&mut self);

    fn release_camera(&mut self);
}

/// Keep-awake resource held while the torch is lit.
pub trait WakeLockPort {
    fn acquire_wake_lock(&mut self) -> Result<(), HardwareError>;

    fn release_wake_lock(&mut self);
}

/// Lock-screen state.
pub trait KeyguardPort {
    fn is_locked(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Quick record
// ───────────────────────────────────────────────────────────────

/// Audio recorder and player for the quick-record tile.
pub trait RecorderPort {
    fn start_recording(&mut self, path: &str) -> Result<(), HardwareError>;

    fn stop_recording(&mut self);

    fn start_playback(&mut self, path: &str) -> Result<(), HardwareError>;

    fn stop_playback(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Shell / filesystem
// ───────────────────────────────────────────────────────────────

/// Writes to sysfs-style nodes, with a privileged fallback if needed.
pub trait ShellPort {
    fn write_node(&mut self, path: &str, value: &str) -> Result<(), HardwareError>;

    fn read_node(&mut self, path: &str) -> Option<String>;
}

/// Synchronous existence check, used once at setup.
pub trait FileProbe {
    fn exists(&self, path: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Background work (results return through the inbox)
// ───────────────────────────────────────────────────────────────

/// Off-thread lookups.  Each reports back with a `ControlMsg` carrying the
/// generation it was started with.
pub trait BackgroundPort {
    /// Resolve the current user's name and avatar → `UserInfoLoaded`.
    fn spawn_user_lookup(&mut self, generation: u32);

    /// Resolve a contact by lookup key → `FavContactLoaded`.
    fn spawn_fav_contact_lookup(&mut self, generation: u32, lookup_key: Option<String>);

    /// Check the recording file → `RecordingFileChecked`, echoing `epoch`.
    fn spawn_file_check(&mut self, path: String, epoch: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / UI shell)
// ───────────────────────────────────────────────────────────────

/// The panel emits structured [`PanelEvent`](super::events::PanelEvent)s
/// through this port.  Adapters decide where they go (log, UI shell, test
/// recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::PanelEvent);
}

// ───────────────────────────────────────────────────────────────
// Device bundle
// ───────────────────────────────────────────────────────────────

/// Every device-side port at once, so call sites take a single `dev`
/// argument instead of nine.
pub trait DevicePorts:
    ActionPort
    + StatePoller
    + CameraPort
    + WakeLockPort
    + KeyguardPort
    + RecorderPort
    + ShellPort
    + FileProbe
    + BackgroundPort
{
}

impl<T> DevicePorts for T where
    T: ActionPort
        + StatePoller
        + CameraPort
        + WakeLockPort
        + KeyguardPort
        + RecorderPort
        + ShellPort
        + FileProbe
        + BackgroundPort
{
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first run).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`SettingsStore`] operations.
#[derive(Debug, PartialEq, Eq)]
pub enum StorageError {
    /// Settings provider rejected the write.
    Rejected,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Rejected => write!(f, "write rejected"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
