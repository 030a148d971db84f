//! Per-kind dispatch from raw subsystem values to display state.
//!
//! Subsystems report whatever they know, best effort.  `render` is total:
//! every `(kind, value)` pair produces a `TileState`, falling back to the
//! plain on/off rendering when the value family does not match the tile.

use super::state::{IconRef, TilePayload, TileState, text_for};
use crate::registry::ToggleKind;

/// Radio adapter power state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    Off,
    TurningOn,
    On,
    TurningOff,
    Unknown,
}

impl RadioState {
    /// On, or heading there.
    pub fn is_active(self) -> bool {
        matches!(self, Self::On | Self::TurningOn)
    }
}

/// Audio manager ringer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingerMode {
    Silent = 0,
    Vibrate = 1,
    Normal = 2,
}

impl RingerMode {
    /// Decode the persisted `mode_ringer` integer.
    pub fn from_setting(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Silent),
            1 => Some(Self::Vibrate),
            2 => Some(Self::Normal),
            _ => None,
        }
    }

    /// Order used by the sound-state cycle tile.
    pub fn next(self) -> Self {
        match self {
            Self::Normal => Self::Vibrate,
            Self::Vibrate => Self::Silent,
            Self::Silent => Self::Normal,
        }
    }
}

/// A raw, best-effort value reported by a subsystem (poll or notification).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalValue {
    Switch(bool),
    Radio(RadioState),
    Wifi {
        state: RadioState,
        ssid: Option<String>,
    },
    Battery {
        level: u8,
        charging: bool,
    },
    Signal {
        strength: u8,
        data_type: Option<&'static str>,
        connected: bool,
        operator: Option<String>,
    },
    Bluetooth {
        enabled: bool,
        connected: bool,
    },
    Ringer(RingerMode),
    Profile {
        name: String,
        image: Option<String>,
    },
    Text(String),
}

impl ExternalValue {
    /// Best reading of "is it on" across value families.
    pub fn is_on(&self) -> bool {
        match self {
            Self::Switch(on) => *on,
            Self::Radio(state) | Self::Wifi { state, .. } => state.is_active(),
            Self::Bluetooth { enabled, .. } => *enabled,
            Self::Signal { connected, .. } => *connected,
            Self::Battery { charging, .. } => *charging,
            Self::Ringer(mode) => *mode != RingerMode::Normal,
            Self::Profile { .. } | Self::Text(_) => true,
        }
    }
}

/// Map a reported value to what the tile should show.
pub fn render(kind: ToggleKind, value: &ExternalValue) -> TileState {
    match (kind, value) {
        (ToggleKind::Wifi, ExternalValue::Wifi { state, ssid }) => wifi(*state, ssid.as_deref()),
        (ToggleKind::Battery, ExternalValue::Battery { level, charging }) => {
            battery(*level, *charging)
        }
        (
            ToggleKind::Signal,
            ExternalValue::Signal {
                strength,
                data_type,
                connected,
                operator,
            },
        ) => signal(*strength, *data_type, *connected, operator.as_deref()),
        (ToggleKind::Bluetooth, ExternalValue::Bluetooth { enabled, connected }) => {
            bluetooth(*enabled, *connected)
        }
        (ToggleKind::User | ToggleKind::FavContact, ExternalValue::Profile { name, image }) => {
            avatar(kind, name, image.clone())
        }
        (ToggleKind::Vibrate | ToggleKind::Silent | ToggleKind::SoundState, ExternalValue::Ringer(mode)) => {
            ringer(kind, *mode)
        }
        (_, ExternalValue::Radio(state)) => radio(kind, *state),
        (_, ExternalValue::Text(label)) => {
            let t = text_for(kind);
            TileState {
                label: label.clone(),
                icon: t.on,
                enabled: true,
                payload: TilePayload::None,
            }
        }
        (_, other) => switch(kind, other.is_on()),
    }
}

/// Plain on/off rendering.
pub fn switch(kind: ToggleKind, on: bool) -> TileState {
    let t = text_for(kind);
    TileState {
        label: String::from(t.name),
        icon: if on { t.on } else { t.off },
        enabled: on,
        payload: TilePayload::None,
    }
}

fn radio(kind: ToggleKind, state: RadioState) -> TileState {
    let t = text_for(kind);
    let label = match state {
        RadioState::TurningOn => String::from("Turning on"),
        RadioState::TurningOff => String::from("Turning off"),
        _ => String::from(t.name),
    };
    TileState {
        label,
        icon: if state.is_active() { t.on } else { t.off },
        enabled: state.is_active(),
        payload: TilePayload::None,
    }
}

fn wifi(state: RadioState, ssid: Option<&str>) -> TileState {
    let mut tile = radio(ToggleKind::Wifi, state);
    let connected = state == RadioState::On && ssid.is_some();
    if let Some(name) = ssid.filter(|_| connected) {
        tile.label = String::from(name);
    }
    tile.payload = TilePayload::Wifi {
        connected,
        ssid: ssid.map(String::from),
    };
    tile
}

fn battery(level: u8, charging: bool) -> TileState {
    let level = level.min(100);
    let label = if charging && level == 100 {
        String::from("Charged")
    } else if charging {
        format!("{level}%, charging")
    } else {
        format!("{level}%")
    };
    TileState {
        label,
        icon: text_for(ToggleKind::Battery).on,
        enabled: charging,
        payload: TilePayload::Battery { level, charging },
    }
}

fn signal(strength: u8, data_type: Option<&'static str>, connected: bool, operator: Option<&str>) -> TileState {
    let t = text_for(ToggleKind::Signal);
    let label = match operator {
        Some(op) if connected => String::from(op),
        _ if connected => String::from(t.name),
        _ => String::from("No service"),
    };
    TileState {
        label,
        icon: if connected { t.on } else { t.off },
        enabled: connected,
        payload: TilePayload::Signal {
            strength: strength.min(4),
            data_type_icon: data_type.map(IconRef),
            connected,
        },
    }
}

fn bluetooth(enabled: bool, connected: bool) -> TileState {
    let t = text_for(ToggleKind::Bluetooth);
    let label = if enabled && connected {
        String::from("Connected")
    } else {
        String::from(t.name)
    };
    TileState {
        label,
        icon: if enabled { t.on } else { t.off },
        enabled,
        payload: TilePayload::Bluetooth {
            connected: enabled && connected,
        },
    }
}

fn avatar(kind: ToggleKind, name: &str, image: Option<String>) -> TileState {
    TileState {
        label: String::from(name),
        icon: text_for(kind).on,
        enabled: true,
        payload: TilePayload::Avatar {
            name: String::from(name),
            image,
        },
    }
}

fn ringer(kind: ToggleKind, mode: RingerMode) -> TileState {
    match kind {
        ToggleKind::Vibrate => switch(kind, mode == RingerMode::Vibrate),
        ToggleKind::Silent => switch(kind, mode == RingerMode::Silent),
        _ => {
            let (label, icon) = match mode {
                RingerMode::Normal => ("Sound", "ic_qs_sound_normal"),
                RingerMode::Vibrate => ("Vibrate", "ic_qs_sound_vibrate"),
                RingerMode::Silent => ("Silent", "ic_qs_sound_silent"),
            };
            TileState {
                label: String::from(label),
                icon: IconRef(icon),
                enabled: true,
                payload: TilePayload::None,
            }
        }
    }
}
