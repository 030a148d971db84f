//! Simulated device.
//!
//! Stands in for the platform on the host: radios that take a few polls to
//! settle and never announce it, notified toggles that report immediately
//! through the inbox, a camera whose preview comes up after a configurable
//! number of checks, and a recorder that writes its file on stop.
//! Shell, file probe and background work are delegated to the real host
//! adapters.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use log::{debug, info, warn};

use super::background::ThreadBackground;
use super::shell::SysfsShell;
use crate::app::ports::{
    ActionPort, BackgroundPort, BroadcastCommand, CameraPort, FileProbe, KeyguardPort, PanelAction, RecorderPort,
    ShellPort, StatePoller, WakeLockPort,
};
use crate::error::{ActionError, HardwareError};
use crate::events::{ControlMsg, Inbox};
use crate::registry::ToggleKind;
use crate::tiles::{ExternalValue, RadioState, RingerMode};

/// A switch that settles some polls after being commanded.
#[derive(Debug, Clone, Copy, Default)]
struct SimRadio {
    on: bool,
    target: Option<bool>,
    polls_left: u8,
}

impl SimRadio {
    fn command(&mut self, on: bool, settle_polls: u8) {
        if settle_polls == 0 {
            self.on = on;
            self.target = None;
        } else {
            self.target = Some(on);
            self.polls_left = settle_polls;
        }
    }

    fn poll(&mut self) -> RadioState {
        match self.target {
            Some(target) => {
                self.polls_left = self.polls_left.saturating_sub(1);
                if self.polls_left == 0 {
                    self.on = target;
                    self.target = None;
                    self.state()
                } else if target {
                    RadioState::TurningOn
                } else {
                    RadioState::TurningOff
                }
            }
            None => self.state(),
        }
    }

    fn state(&self) -> RadioState {
        if self.on { RadioState::On } else { RadioState::Off }
    }
}

pub struct SimulatedDevice {
    inbox: Arc<Inbox>,
    shell: SysfsShell,
    background: ThreadBackground,

    radios: HashMap<ToggleKind, SimRadio>,
    settle_polls: u8,
    ssid: String,
    battery: (u8, bool),
    signal_strength: u8,
    bt_connected: bool,
    airplane: bool,
    rotation_locked: bool,
    mobile_data: bool,
    ringer: RingerMode,
    /// Actions that fail with `ServiceUnavailable`.
    unavailable: Vec<ToggleKind>,

    preview_after: Option<u32>,
    preview_checks: u32,
    camera_open: bool,
    wake_lock: bool,
    locked: bool,

    recording: Option<String>,
    playing: bool,

    pub actions: Vec<PanelAction>,
}

impl SimulatedDevice {
    pub fn new(inbox: Arc<Inbox>, shell: SysfsShell, background: ThreadBackground) -> Self {
        Self {
            inbox,
            shell,
            background,
            radios: HashMap::new(),
            settle_polls: 3,
            ssid: String::from("HomeNet"),
            battery: (76, false),
            signal_strength: 3,
            bt_connected: false,
            airplane: false,
            rotation_locked: false,
            mobile_data: true,
            ringer: RingerMode::Normal,
            unavailable: Vec::new(),
            preview_after: Some(2),
            preview_checks: 0,
            camera_open: false,
            wake_lock: false,
            locked: false,
            recording: None,
            playing: false,
            actions: Vec::new(),
        }
    }

    /// Polls a commanded radio takes to settle.
    pub fn set_settle_polls(&mut self, polls: u8) {
        self.settle_polls = polls;
    }

    /// Preview checks before the torch preview is up; `None` never.
    pub fn set_preview_after(&mut self, checks: Option<u32>) {
        self.preview_after = checks;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn set_battery(&mut self, level: u8, charging: bool) {
        self.battery = (level, charging);
        self.report(ToggleKind::Battery, ExternalValue::Battery { level, charging });
    }

    pub fn set_unavailable(&mut self, kind: ToggleKind) {
        self.unavailable.push(kind);
    }

    /// Whether any torch hardware is still held.
    pub fn torch_held(&self) -> bool {
        self.camera_open || self.wake_lock
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn background(&mut self) -> &mut ThreadBackground {
        &mut self.background
    }

    fn radio(&mut self, kind: ToggleKind) -> &mut SimRadio {
        self.radios.entry(kind).or_default()
    }

    fn command(&mut self, kind: ToggleKind, on: bool) {
        let settle = self.settle_polls;
        self.radio(kind).command(on, settle);
    }

    fn report(&self, kind: ToggleKind, value: ExternalValue) {
        self.inbox.post(ControlMsg::ExternalStateChanged { kind, value });
    }

    fn report_ringer(&self) {
        for kind in [ToggleKind::Vibrate, ToggleKind::Silent, ToggleKind::SoundState] {
            self.report(kind, ExternalValue::Ringer(self.ringer));
        }
    }

    fn signal(&self) -> ExternalValue {
        ExternalValue::Signal {
            strength: if self.airplane { 0 } else { self.signal_strength },
            data_type: (self.mobile_data && !self.airplane).then_some("ic_qs_signal_4g"),
            connected: self.mobile_data && !self.airplane,
            operator: (!self.airplane).then(|| String::from("SimCell")),
        }
    }

    fn kind_for(action: PanelAction) -> ToggleKind {
        match action {
            PanelAction::SetWifi(_) => ToggleKind::Wifi,
            PanelAction::SetWifiAp(_) => ToggleKind::WifiTether,
            PanelAction::SetBluetooth(_) => ToggleKind::Bluetooth,
            PanelAction::SetNfc(_) => ToggleKind::Nfc,
            PanelAction::SetUsbTether(_) => ToggleKind::UsbTether,
            PanelAction::SetMasterSync(_) => ToggleKind::Sync,
            PanelAction::SetGps(_) => ToggleKind::Gps,
            PanelAction::SetRotationLock(_) => ToggleKind::Rotate,
            PanelAction::SetAirplaneMode(_) => ToggleKind::Airplane,
            PanelAction::SetMobileData(_) => ToggleKind::Signal,
            PanelAction::SetTwoGOnly(_) => ToggleKind::TwoG,
            PanelAction::SetLte(_) => ToggleKind::Lte,
            PanelAction::SetRingerMode(_) => ToggleKind::SoundState,
            PanelAction::Broadcast(BroadcastCommand::ToggleVibrate) => ToggleKind::Vibrate,
            PanelAction::Broadcast(BroadcastCommand::ToggleSilent) => ToggleKind::Silent,
            PanelAction::Broadcast(BroadcastCommand::RebootMenu) => ToggleKind::RebootMenu,
        }
    }
}

// ── ActionPort ────────────────────────────────────────────────

impl ActionPort for SimulatedDevice {
    fn perform(&mut self, action: PanelAction) -> Result<(), ActionError> {
        let kind = Self::kind_for(action);
        if self.unavailable.contains(&kind) {
            return Err(ActionError::ServiceUnavailable);
        }
        self.actions.push(action);
        debug!("sim: {:?}", action);

        match action {
            PanelAction::SetWifi(on) => self.command(ToggleKind::Wifi, on),
            PanelAction::SetWifiAp(on) => self.command(ToggleKind::WifiTether, on),
            PanelAction::SetBluetooth(on) => {
                self.command(ToggleKind::Bluetooth, on);
                if !on {
                    self.bt_connected = false;
                }
            }
            PanelAction::SetNfc(on) => self.command(ToggleKind::Nfc, on),
            PanelAction::SetUsbTether(on) => self.command(ToggleKind::UsbTether, on),
            PanelAction::SetMasterSync(on) => self.command(ToggleKind::Sync, on),
            PanelAction::SetGps(on) => self.command(ToggleKind::Gps, on),
            PanelAction::SetTwoGOnly(on) => self.command(ToggleKind::TwoG, on),
            PanelAction::SetLte(on) => self.command(ToggleKind::Lte, on),
            PanelAction::SetRotationLock(locked) => {
                self.rotation_locked = locked;
                self.report(ToggleKind::Rotate, ExternalValue::Switch(!locked));
            }
            PanelAction::SetAirplaneMode(on) => {
                self.airplane = on;
                self.report(ToggleKind::Airplane, ExternalValue::Switch(on));
                self.report(ToggleKind::Signal, self.signal());
            }
            PanelAction::SetMobileData(on) => {
                self.mobile_data = on;
                self.report(ToggleKind::Signal, self.signal());
            }
            PanelAction::SetRingerMode(mode) => {
                self.ringer = mode;
                self.report_ringer();
            }
            PanelAction::Broadcast(BroadcastCommand::ToggleVibrate) => {
                self.ringer = if self.ringer == RingerMode::Vibrate {
                    RingerMode::Normal
                } else {
                    RingerMode::Vibrate
                };
                self.report_ringer();
            }
            PanelAction::Broadcast(BroadcastCommand::ToggleSilent) => {
                self.ringer = if self.ringer == RingerMode::Silent {
                    RingerMode::Normal
                } else {
                    RingerMode::Silent
                };
                self.report_ringer();
            }
            PanelAction::Broadcast(BroadcastCommand::RebootMenu) => info!("sim: reboot menu requested"),
        }
        Ok(())
    }
}

// ── StatePoller ───────────────────────────────────────────────

impl StatePoller for SimulatedDevice {
    fn poll(&mut self, kind: ToggleKind) -> Option<ExternalValue> {
        match kind {
            ToggleKind::Wifi => {
                let state = self.radio(kind).poll();
                let ssid = (state == RadioState::On).then(|| self.ssid.clone());
                Some(ExternalValue::Wifi { state, ssid })
            }
            ToggleKind::Bluetooth => {
                let enabled = self.radio(kind).poll().is_active();
                Some(ExternalValue::Bluetooth {
                    enabled,
                    connected: enabled && self.bt_connected,
                })
            }
            ToggleKind::WifiTether
            | ToggleKind::Nfc
            | ToggleKind::UsbTether
            | ToggleKind::Sync
            | ToggleKind::Gps
            | ToggleKind::TwoG
            | ToggleKind::Lte => Some(ExternalValue::Radio(self.radio(kind).poll())),
            ToggleKind::Battery => Some(ExternalValue::Battery {
                level: self.battery.0,
                charging: self.battery.1,
            }),
            ToggleKind::Signal => Some(self.signal()),
            ToggleKind::Rotate => Some(ExternalValue::Switch(!self.rotation_locked)),
            ToggleKind::Airplane => Some(ExternalValue::Switch(self.airplane)),
            ToggleKind::Brightness => Some(ExternalValue::Switch(true)),
            ToggleKind::Clock => Some(ExternalValue::Text(String::from("12:00"))),
            _ => None,
        }
    }
}

// ── Torch hardware ────────────────────────────────────────────

impl CameraPort for SimulatedDevice {
    fn open_camera(&mut self) -> Result<(), HardwareError> {
        if self.camera_open {
            return Err(HardwareError::CameraUnavailable);
        }
        self.camera_open = true;
        self.preview_checks = 0;
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), HardwareError> {
        if self.camera_open {
            Ok(())
        } else {
            Err(HardwareError::PreviewFailed)
        }
    }

    fn set_flash(&mut self, on: bool) -> Result<(), HardwareError> {
        debug!("sim: flash {}", if on { "torch" } else { "off" });
        Ok(())
    }

    fn preview_ready(&mut self) -> bool {
        self.preview_checks += 1;
        self.preview_after.is_some_and(|n| self.preview_checks >= n)
    }

    fn stop_preview(&mut self) {}

    fn release_camera(&mut self) {
        self.camera_open = false;
    }
}

impl WakeLockPort for SimulatedDevice {
    fn acquire_wake_lock(&mut self) -> Result<(), HardwareError> {
        self.wake_lock = true;
        Ok(())
    }

    fn release_wake_lock(&mut self) {
        self.wake_lock = false;
    }
}

impl KeyguardPort for SimulatedDevice {
    fn is_locked(&self) -> bool {
        self.locked
    }
}

// ── Quick record ──────────────────────────────────────────────

impl RecorderPort for SimulatedDevice {
    fn start_recording(&mut self, path: &str) -> Result<(), HardwareError> {
        self.recording = Some(String::from(path));
        Ok(())
    }

    fn stop_recording(&mut self) {
        if let Some(path) = self.recording.take() {
            if let Err(e) = fs::write(&path, b"sim-audio") {
                warn!("sim: cannot write recording {}: {}", path, e);
            }
        }
    }

    fn start_playback(&mut self, path: &str) -> Result<(), HardwareError> {
        if !self.shell.exists(path) {
            return Err(HardwareError::PlayerUnavailable);
        }
        self.playing = true;
        Ok(())
    }

    fn stop_playback(&mut self) {
        self.playing = false;
    }
}

// ── Delegated ports ───────────────────────────────────────────

impl ShellPort for SimulatedDevice {
    fn write_node(&mut self, path: &str, value: &str) -> Result<(), HardwareError> {
        self.shell.write_node(path, value)
    }

    fn read_node(&mut self, path: &str) -> Option<String> {
        self.shell.read_node(path)
    }
}

impl FileProbe for SimulatedDevice {
    fn exists(&self, path: &str) -> bool {
        self.shell.exists(path)
    }
}

impl BackgroundPort for SimulatedDevice {
    fn spawn_user_lookup(&mut self, generation: u32) {
        self.background.spawn_user_lookup(generation);
    }

    fn spawn_fav_contact_lookup(&mut self, generation: u32, lookup_key: Option<String>) {
        self.background.spawn_fav_contact_lookup(generation, lookup_key);
    }

    fn spawn_file_check(&mut self, path: String, epoch: u32) {
        self.background.spawn_file_check(path, epoch);
    }
}
