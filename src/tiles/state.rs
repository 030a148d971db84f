//! Display state of a single tile.

use serde::Serialize;

use crate::fsm::recorder::RecorderState;
use crate::registry::ToggleKind;

/// Symbolic icon identifier.  The renderer maps it to an actual drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IconRef(pub &'static str);

impl IconRef {
    pub const fn name(self) -> &'static str {
        self.0
    }
}

/// Kind-specific payload carried alongside label and icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TilePayload {
    None,
    Battery {
        level: u8,
        charging: bool,
    },
    Signal {
        /// 0..=4 bars.
        strength: u8,
        data_type_icon: Option<IconRef>,
        connected: bool,
    },
    Avatar {
        name: String,
        image: Option<String>,
    },
    Bluetooth {
        connected: bool,
    },
    Wifi {
        connected: bool,
        ssid: Option<String>,
    },
    Recorder {
        state: RecorderState,
    },
}

/// What the panel shows for one toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileState {
    pub label: String,
    pub icon: IconRef,
    /// Whether the toggle reads as "on".
    pub enabled: bool,
    pub payload: TilePayload,
}

impl TileState {
    /// State shown before anything has been reported for `kind`.
    pub fn placeholder(kind: ToggleKind) -> Self {
        let text = text_for(kind);
        Self {
            label: String::from(text.name),
            icon: text.off,
            enabled: false,
            payload: TilePayload::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-kind text and icons
// ---------------------------------------------------------------------------

/// Static label and icon pair for a kind.
pub struct TileText {
    pub name: &'static str,
    pub on: IconRef,
    pub off: IconRef,
}

const fn text(name: &'static str, on: &'static str, off: &'static str) -> TileText {
    TileText {
        name,
        on: IconRef(on),
        off: IconRef(off),
    }
}

/// Indexed by `ToggleKind as usize`.
static TILE_TEXT: [TileText; ToggleKind::COUNT] = [
    text("User", "ic_qs_default_user", "ic_qs_default_user"),
    text("Brightness", "ic_qs_brightness_auto_on", "ic_qs_brightness_auto_off"),
    text("Settings", "ic_qs_settings", "ic_qs_settings"),
    text("Wi-Fi", "ic_qs_wifi_on", "ic_qs_wifi_off"),
    text("Mobile data", "ic_qs_signal_on", "ic_qs_signal_off"),
    text("Auto-rotate", "ic_qs_auto_rotate", "ic_qs_rotation_locked"),
    text("Clock", "ic_qs_clock", "ic_qs_clock"),
    text("GPS", "ic_qs_location_on", "ic_qs_location_off"),
    text("Input method", "ic_qs_ime", "ic_qs_ime"),
    text("Battery", "ic_qs_battery", "ic_qs_battery"),
    text("Airplane mode", "ic_qs_airplane_on", "ic_qs_airplane_off"),
    text("Bluetooth", "ic_qs_bluetooth_on", "ic_qs_bluetooth_off"),
    text("Vibrate", "ic_qs_vibrate_on", "ic_qs_vibrate_off"),
    text("Silent", "ic_qs_silence_on", "ic_qs_silence_off"),
    text("Fast charge", "ic_qs_fcharge_on", "ic_qs_fcharge_off"),
    text("Sync", "ic_qs_sync_on", "ic_qs_sync_off"),
    text("NFC", "ic_qs_nfc_on", "ic_qs_nfc_off"),
    text("Torch", "ic_qs_torch_on", "ic_qs_torch_off"),
    text("Wi-Fi AP", "ic_qs_wifi_ap_on", "ic_qs_wifi_ap_off"),
    text("USB tether", "ic_qs_usb_tether_on", "ic_qs_usb_tether_off"),
    text("2G", "ic_qs_2g_on", "ic_qs_2g_off"),
    text("LTE", "ic_qs_lte_on", "ic_qs_lte_off"),
    text("Favourite", "ic_qs_default_user", "ic_qs_default_user"),
    text("Sound", "ic_qs_sound_normal", "ic_qs_sound_normal"),
    text("Reboot", "ic_qs_reboot", "ic_qs_reboot"),
    text("Quick record", "ic_qs_quickrecord", "ic_qs_quickrecord"),
    text("Memory", "ic_qs_memory", "ic_qs_memory"),
    text("Pie", "ic_qs_pie_on", "ic_qs_pie_off"),
    text("Expanded desktop", "ic_qs_expanded_desktop_on", "ic_qs_expanded_desktop_off"),
];

pub fn text_for(kind: ToggleKind) -> &'static TileText {
    &TILE_TEXT[kind.index()]
}
