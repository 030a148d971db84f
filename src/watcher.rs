//! Settings and platform change watcher.
//!
//! Translates inbound [`ControlMsg`]s into [`Trigger`]s the panel acts on.
//! It also tracks which live-state feeds the current toggle order needs:
//! notifications from a feed no visible tile uses are dropped here, the way
//! an unregistered platform receiver would never deliver them.

use log::{debug, info};

use crate::events::{ControlMsg, ProfileInfo, SettingKey};
use crate::order::ToggleOrder;
use crate::registry::{LiveSource, ToggleKind};
use crate::tiles::ExternalValue;

/// What the panel should do in response to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Re-read order and layout, rebuild the visible set.
    Reconfigure,
    /// Authoritative state for a kind; cancels any confirmation job.
    Authoritative { kind: ToggleKind, value: ExternalValue },
    /// Re-read these tiles from their backing settings.
    Refresh(&'static [ToggleKind]),
    /// Start fresh user and favourite-contact lookups.
    ReloadProfiles,
    UserInfo { generation: u32, info: ProfileInfo },
    FavContact { generation: u32, info: Option<ProfileInfo> },
    RecordingFile { epoch: u32, exists: bool },
    PlaybackCompleted,
    Keyguard { locked: bool },
    Ignore,
}

const RINGER_TILES: &[ToggleKind] = &[ToggleKind::Vibrate, ToggleKind::Silent, ToggleKind::SoundState];
const TORCH_TILE: &[ToggleKind] = &[ToggleKind::Torch];
const PIE_TILE: &[ToggleKind] = &[ToggleKind::Pie];
const EXPANDED_DESKTOP_TILE: &[ToggleKind] = &[ToggleKind::ExpandedDesktop];
const FAST_CHARGE_TILE: &[ToggleKind] = &[ToggleKind::FastCharge];

/// Tracks live-source subscriptions and merged notification state.
#[derive(Debug, Default)]
pub struct SettingsChangeWatcher {
    subscribed: [bool; LiveSource::COUNT],
    bt_enabled: bool,
    bt_connected: bool,
    display_mirroring: bool,
}

impl SettingsChangeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to exactly the live sources `order` needs.
    /// Returns how many subscriptions changed.
    pub fn resubscribe(&mut self, order: &ToggleOrder) -> usize {
        let mut wanted = [false; LiveSource::COUNT];
        for kind in order.iter() {
            if let Some(src) = kind.descriptor().live_source {
                wanted[src as usize] = true;
            }
        }

        let mut changed = 0;
        for (i, (now, want)) in self.subscribed.iter_mut().zip(wanted).enumerate() {
            if *now != want {
                info!(
                    "watcher: {} live source #{}",
                    if want { "subscribing to" } else { "dropping" },
                    i
                );
                *now = want;
                changed += 1;
            }
        }
        changed
    }

    pub fn is_subscribed(&self, src: LiveSource) -> bool {
        self.subscribed[src as usize]
    }

    pub fn display_mirroring(&self) -> bool {
        self.display_mirroring
    }

    /// Translate one message.
    pub fn translate(&mut self, msg: ControlMsg) -> Trigger {
        match msg {
            ControlMsg::SettingsChanged { key } => Self::on_setting(key),
            ControlMsg::ExternalStateChanged { kind, value } => {
                if let ExternalValue::Bluetooth { enabled, connected } = value {
                    self.bt_enabled = enabled;
                    self.bt_connected = connected;
                }
                self.gated(kind, value)
            }
            ControlMsg::BluetoothAdapterChanged { enabled } => {
                self.bt_enabled = enabled;
                if !enabled {
                    self.bt_connected = false;
                }
                self.bluetooth()
            }
            ControlMsg::BluetoothConnectionChanged { connected } => {
                self.bt_connected = connected;
                self.bluetooth()
            }
            ControlMsg::DisplayMirroringChanged { active } => {
                self.display_mirroring = active;
                debug!("watcher: display mirroring {}", active);
                Trigger::Ignore
            }
            ControlMsg::UserSwitched | ControlMsg::ProfileChanged => Trigger::ReloadProfiles,
            ControlMsg::UserInfoLoaded { generation, info } => Trigger::UserInfo { generation, info },
            ControlMsg::FavContactLoaded { generation, info } => Trigger::FavContact { generation, info },
            ControlMsg::RecordingFileChecked { epoch, exists } => Trigger::RecordingFile { epoch, exists },
            ControlMsg::PlaybackCompleted => Trigger::PlaybackCompleted,
            ControlMsg::KeyguardChanged { locked } => Trigger::Keyguard { locked },
        }
    }

    fn on_setting(key: SettingKey) -> Trigger {
        if key.triggers_reconfigure() {
            return Trigger::Reconfigure;
        }
        match key {
            SettingKey::TorchState => Trigger::Refresh(TORCH_TILE),
            SettingKey::ModeRinger => Trigger::Refresh(RINGER_TILES),
            SettingKey::PieControls => Trigger::Refresh(PIE_TILE),
            SettingKey::ExpandedDesktopState => Trigger::Refresh(EXPANDED_DESKTOP_TILE),
            SettingKey::FastChargeLast => Trigger::Refresh(FAST_CHARGE_TILE),
            _ => Trigger::Ignore,
        }
    }

    fn bluetooth(&self) -> Trigger {
        self.gated(
            ToggleKind::Bluetooth,
            ExternalValue::Bluetooth {
                enabled: self.bt_enabled,
                connected: self.bt_enabled && self.bt_connected,
            },
        )
    }

    fn gated(&self, kind: ToggleKind, value: ExternalValue) -> Trigger {
        match kind.descriptor().live_source {
            Some(src) if !self.is_subscribed(src) => {
                debug!("watcher: {} update dropped, source not subscribed", kind);
                Trigger::Ignore
            }
            _ => Trigger::Authoritative { kind, value },
        }
    }
}
