//! Mock device adapters for integration tests.
//!
//! Records every hardware call, action and background request so tests can
//! assert on the full history without a platform underneath.  Background
//! work is not run; tests answer it by feeding `ControlMsg`s to the panel.

use std::collections::{HashMap, HashSet};

use quickpanel::app::commands::PanelCommand;
use quickpanel::app::events::PanelEvent;
use quickpanel::app::ports::{
    ActionPort, BackgroundPort, CameraPort, EventSink, FileProbe, KeyguardPort, PanelAction,
    RecorderPort, SettingsStore, ShellPort, StatePoller, StorageError, WakeLockPort,
};
use quickpanel::app::service::QuickPanel;
use quickpanel::config::PanelConfig;
use quickpanel::error::{ActionError, HardwareError};
use quickpanel::events::{ControlMsg, SettingKey};
use quickpanel::registry::{DeviceCapabilities, ToggleKind};
use quickpanel::tiles::ExternalValue;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwCall {
    AcquireWakeLock,
    ReleaseWakeLock,
    OpenCamera,
    StartPreview,
    SetFlash(bool),
    StopPreview,
    ReleaseCamera,
    StartRecording(String),
    StopRecording,
    StartPlayback(String),
    StopPlayback,
    WriteNode(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BgCall {
    User(u32),
    FavContact(u32, Option<String>),
    /// Path and the recorder epoch the check was started in.
    FileCheck(String, u32),
}

// ── MockDevice ────────────────────────────────────────────────

pub struct MockDevice {
    pub calls: Vec<HwCall>,
    pub actions: Vec<PanelAction>,
    pub background: Vec<BgCall>,
    /// Value returned by `poll`, per kind.
    pub values: HashMap<ToggleKind, ExternalValue>,
    pub polls: HashMap<ToggleKind, usize>,
    pub files: HashSet<String>,
    pub nodes: HashMap<String, String>,
    pub locked: bool,
    pub preview_ready: bool,
    pub camera_fails: bool,
    pub recorder_fails: bool,
    pub player_fails: bool,
    pub rejected: Vec<ToggleKind>,
}

#[allow(dead_code)]
impl MockDevice {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            actions: Vec::new(),
            background: Vec::new(),
            values: HashMap::new(),
            polls: HashMap::new(),
            files: HashSet::new(),
            nodes: HashMap::new(),
            locked: false,
            preview_ready: true,
            camera_fails: false,
            recorder_fails: false,
            player_fails: false,
            rejected: Vec::new(),
        }
    }

    pub fn set(&mut self, kind: ToggleKind, value: ExternalValue) {
        self.values.insert(kind, value);
    }

    pub fn poll_count(&self, kind: ToggleKind) -> usize {
        self.polls.get(&kind).copied().unwrap_or(0)
    }

    pub fn clear_history(&mut self) {
        self.calls.clear();
        self.actions.clear();
        self.background.clear();
        self.polls.clear();
    }

    pub fn count(&self, call: &HwCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Epoch of the most recent recording-file check.
    pub fn last_file_check(&self) -> Option<u32> {
        self.background.iter().rev().find_map(|b| match b {
            BgCall::FileCheck(_, epoch) => Some(*epoch),
            _ => None,
        })
    }

    pub fn last_generation(&self) -> Option<u32> {
        self.background.iter().rev().find_map(|b| match b {
            BgCall::User(g) | BgCall::FavContact(g, _) => Some(*g),
            BgCall::FileCheck(..) => None,
        })
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionPort for MockDevice {
    fn perform(&mut self, action: PanelAction) -> Result<(), ActionError> {
        let kind = match action {
            PanelAction::SetWifi(_) => Some(ToggleKind::Wifi),
            PanelAction::SetWifiAp(_) => Some(ToggleKind::WifiTether),
            PanelAction::SetBluetooth(_) => Some(ToggleKind::Bluetooth),
            PanelAction::SetGps(_) => Some(ToggleKind::Gps),
            _ => None,
        };
        if kind.is_some_and(|k| self.rejected.contains(&k)) {
            return Err(ActionError::Rejected);
        }
        self.actions.push(action);
        Ok(())
    }
}

impl StatePoller for MockDevice {
    fn poll(&mut self, kind: ToggleKind) -> Option<ExternalValue> {
        *self.polls.entry(kind).or_insert(0) += 1;
        self.values.get(&kind).cloned()
    }
}

impl CameraPort for MockDevice {
    fn open_camera(&mut self) -> Result<(), HardwareError> {
        if self.camera_fails {
            return Err(HardwareError::CameraUnavailable);
        }
        self.calls.push(HwCall::OpenCamera);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::StartPreview);
        Ok(())
    }

    fn set_flash(&mut self, on: bool) -> Result<(), HardwareError> {
        self.calls.push(HwCall::SetFlash(on));
        Ok(())
    }

    fn preview_ready(&mut self) -> bool {
        self.preview_ready
    }

    fn stop_preview(&mut self) {
        self.calls.push(HwCall::StopPreview);
    }

    fn release_camera(&mut self) {
        self.calls.push(HwCall::ReleaseCamera);
    }
}

impl WakeLockPort for MockDevice {
    fn acquire_wake_lock(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::AcquireWakeLock);
        Ok(())
    }

    fn release_wake_lock(&mut self) {
        self.calls.push(HwCall::ReleaseWakeLock);
    }
}

impl KeyguardPort for MockDevice {
    fn is_locked(&self) -> bool {
        self.locked
    }
}

impl RecorderPort for MockDevice {
    fn start_recording(&mut self, path: &str) -> Result<(), HardwareError> {
        if self.recorder_fails {
            return Err(HardwareError::RecorderUnavailable);
        }
        self.calls.push(HwCall::StartRecording(String::from(path)));
        Ok(())
    }

    fn stop_recording(&mut self) {
        self.calls.push(HwCall::StopRecording);
    }

    fn start_playback(&mut self, path: &str) -> Result<(), HardwareError> {
        if self.player_fails || !self.files.contains(path) {
            return Err(HardwareError::PlayerUnavailable);
        }
        self.calls.push(HwCall::StartPlayback(String::from(path)));
        Ok(())
    }

    fn stop_playback(&mut self) {
        self.calls.push(HwCall::StopPlayback);
    }
}

impl ShellPort for MockDevice {
    fn write_node(&mut self, path: &str, value: &str) -> Result<(), HardwareError> {
        self.calls.push(HwCall::WriteNode(String::from(path), String::from(value)));
        self.nodes.insert(String::from(path), String::from(value));
        Ok(())
    }

    fn read_node(&mut self, path: &str) -> Option<String> {
        self.nodes.get(path).cloned()
    }
}

impl FileProbe for MockDevice {
    fn exists(&self, path: &str) -> bool {
        self.files.contains(path) || self.nodes.contains_key(path)
    }
}

impl BackgroundPort for MockDevice {
    fn spawn_user_lookup(&mut self, generation: u32) {
        self.background.push(BgCall::User(generation));
    }

    fn spawn_fav_contact_lookup(&mut self, generation: u32, lookup_key: Option<String>) {
        self.background.push(BgCall::FavContact(generation, lookup_key));
    }

    fn spawn_file_check(&mut self, path: String, epoch: u32) {
        self.background.push(BgCall::FileCheck(path, epoch));
    }
}

// ── MockSettings ──────────────────────────────────────────────

/// Settings map that records writes instead of notifying anyone.
pub struct MockSettings {
    pub values: HashMap<SettingKey, String>,
    pub writes: Vec<(SettingKey, String)>,
}

#[allow(dead_code)]
impl MockSettings {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            writes: Vec::new(),
        }
    }

    pub fn with_order(order: &str) -> Self {
        let mut s = Self::new();
        s.values.insert(SettingKey::QuickToggles, String::from(order));
        s
    }

    pub fn set(&mut self, key: SettingKey, value: &str) {
        self.values.insert(key, String::from(value));
    }

    pub fn get(&self, key: SettingKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }
}

impl Default for MockSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MockSettings {
    fn get_string(&self, key: SettingKey) -> Option<String> {
        self.values.get(&key).cloned()
    }

    fn put_string(&mut self, key: SettingKey, value: &str) -> Result<(), StorageError> {
        self.writes.push((key, String::from(value)));
        self.values.insert(key, String::from(value));
        Ok(())
    }

    fn get_int(&self, key: SettingKey) -> Option<i32> {
        self.values.get(&key).and_then(|v| v.parse().ok())
    }

    fn put_int(&mut self, key: SettingKey, value: i32) -> Result<(), StorageError> {
        self.put_string(key, &value.to_string())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<PanelEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn tile_updates(&self, kind: ToggleKind) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PanelEvent::TileUpdated { kind: k, .. } if *k == kind))
            .count()
    }

    pub fn any(&self, pred: impl Fn(&PanelEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &PanelEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A started panel with mock adapters and a virtual clock.
pub struct Rig {
    pub panel: QuickPanel,
    pub settings: MockSettings,
    pub dev: MockDevice,
    pub sink: RecordingSink,
    pub now_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(order: &str) -> Self {
        Self::build(order, PanelConfig::default(), DeviceCapabilities::default(), |_, _| {})
    }

    /// Build and start a panel; `prepare` runs before `start`.
    pub fn build(
        order: &str,
        config: PanelConfig,
        caps: DeviceCapabilities,
        prepare: impl FnOnce(&mut MockSettings, &mut MockDevice),
    ) -> Self {
        let mut rig = Self {
            panel: QuickPanel::new(config, caps),
            settings: MockSettings::with_order(order),
            dev: MockDevice::new(),
            sink: RecordingSink::new(),
            now_ms: 0,
        };
        prepare(&mut rig.settings, &mut rig.dev);
        rig.panel
            .start(0, &mut rig.settings, &mut rig.dev, &mut rig.sink);
        rig
    }

    pub fn command(&mut self, cmd: PanelCommand) {
        self.panel
            .handle_command(cmd, self.now_ms, &mut self.settings, &mut self.dev, &mut self.sink);
    }

    pub fn tap(&mut self, kind: ToggleKind) {
        self.command(PanelCommand::Tap(kind));
    }

    pub fn long_press(&mut self, kind: ToggleKind) {
        self.command(PanelCommand::LongPress(kind));
    }

    pub fn message(&mut self, msg: ControlMsg) {
        self.panel
            .handle_message(msg, self.now_ms, &mut self.settings, &mut self.dev, &mut self.sink);
    }

    /// Answer the most recent recording-file check.
    pub fn answer_file_check(&mut self, exists: bool) {
        let epoch = self
            .dev
            .last_file_check()
            .expect("no recording-file check was started");
        self.message(ControlMsg::RecordingFileChecked { epoch, exists });
    }

    /// Fire every timer due within the next `delta_ms`, in order.
    pub fn run_for(&mut self, delta_ms: u64) {
        let until = self.now_ms + delta_ms;
        while let Some(due) = self.panel.next_due().filter(|d| *d <= until) {
            self.now_ms = self.now_ms.max(due);
            self.panel
                .advance(self.now_ms, &mut self.settings, &mut self.dev, &mut self.sink);
        }
        self.now_ms = until;
    }
}
