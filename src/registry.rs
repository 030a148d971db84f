//! Static toggle catalogue.
//!
//! Every toggle the panel knows about is a member of the closed
//! [`ToggleKind`] enum.  Per-kind metadata lives in a single descriptor
//! table indexed by `kind as usize`; there is no runtime registration.
//!
//! ```text
//! ┌──────────────┬────────────┬───────────────┬──────────────┬────────────┐
//! │ ToggleKind   │ token      │ tile kind     │ confirmation │ live source│
//! ├──────────────┼────────────┼───────────────┼──────────────┼────────────┤
//! │ Wifi         │ "WIFI"     │ Wifi          │ Polled       │ Network    │
//! │ Torch        │ "TORCH"    │ Plain         │ StateMachine │ none       │
//! │ RebootMenu   │ "REBOOTMENU"│ Plain        │ FireAndForget│ none       │
//! └──────────────┴────────────┴───────────────┴──────────────┴────────────┘
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Toggle identity
// ---------------------------------------------------------------------------

/// Every toggle the panel can show.
/// Must stay in sync with [`DESCRIPTORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ToggleKind {
    User = 0,
    Brightness = 1,
    Settings = 2,
    Wifi = 3,
    Signal = 4,
    Rotate = 5,
    Clock = 6,
    Gps = 7,
    Ime = 8,
    Battery = 9,
    Airplane = 10,
    Bluetooth = 11,
    Vibrate = 12,
    Silent = 13,
    FastCharge = 14,
    Sync = 15,
    Nfc = 16,
    Torch = 17,
    WifiTether = 18,
    UsbTether = 19,
    TwoG = 20,
    Lte = 21,
    FavContact = 22,
    SoundState = 23,
    RebootMenu = 24,
    QuickRecord = 25,
    Memory = 26,
    Pie = 27,
    ExpandedDesktop = 28,
}

impl ToggleKind {
    /// Total number of kinds; sizes every per-kind table in the crate.
    pub const COUNT: usize = 29;

    /// All kinds in discriminant order.
    pub const ALL: [ToggleKind; Self::COUNT] = [
        Self::User,
        Self::Brightness,
        Self::Settings,
        Self::Wifi,
        Self::Signal,
        Self::Rotate,
        Self::Clock,
        Self::Gps,
        Self::Ime,
        Self::Battery,
        Self::Airplane,
        Self::Bluetooth,
        Self::Vibrate,
        Self::Silent,
        Self::FastCharge,
        Self::Sync,
        Self::Nfc,
        Self::Torch,
        Self::WifiTether,
        Self::UsbTether,
        Self::TwoG,
        Self::Lte,
        Self::FavContact,
        Self::SoundState,
        Self::RebootMenu,
        Self::QuickRecord,
        Self::Memory,
        Self::Pie,
        Self::ExpandedDesktop,
    ];

    /// Index into per-kind tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The persisted configuration token for this kind.
    pub fn token(self) -> &'static str {
        self.descriptor().token
    }

    /// Look up a kind by its configuration token (case-sensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        DESCRIPTORS.iter().find(|d| d.token == token).map(|d| d.kind)
    }

    /// Static metadata for this kind.
    pub fn descriptor(self) -> &'static ToggleDescriptor {
        &DESCRIPTORS[self.index()]
    }
}

impl core::fmt::Display for ToggleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.token())
    }
}

// ---------------------------------------------------------------------------
// Descriptor vocabulary
// ---------------------------------------------------------------------------

/// Which payload family a tile renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// Label + icon only.
    Plain,
    /// Battery level + charging indicator.
    Battery,
    /// Cellular signal strength + data-type icon.
    Signal,
    /// Wi-Fi radio with SSID.
    Wifi,
    /// Bluetooth adapter with connection flag.
    Bluetooth,
    /// Avatar image + name (current user, favourite contact).
    Avatar,
    /// Quick-record state.
    Recorder,
}

/// Platform capability that gates a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    MobileData,
    RotationLock,
    Bluetooth,
    CameraFlash,
    Nfc,
    /// Configured and present fast-charge sysfs node.
    FastChargeNode,
}

/// Whether a kind appears in the fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultVisibility {
    Hidden,
    Shown,
    ShownWith(Capability),
}

/// How a user action on this kind gets confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// No reliable change broadcast: bounded polling after each action,
    /// cancelled early by any authoritative notification.
    Polled,
    /// State arrives through a settings or broadcast notification.
    Notified,
    /// Owned by a dedicated state machine (torch, quick record).
    StateMachine,
    /// Command dispatch with no confirmation (reboot menu, fast charge).
    FireAndForget,
    /// Tap opens another surface; nothing to confirm.
    Navigation,
}

/// External live-state feed a visible tile needs a subscription for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LiveSource {
    Network = 0,
    Bluetooth = 1,
    Battery = 2,
    Location = 3,
    RotationPolicy = 4,
}

impl LiveSource {
    pub const COUNT: usize = 5;
}

/// One row of the catalogue.
pub struct ToggleDescriptor {
    pub kind: ToggleKind,
    pub token: &'static str,
    pub tile: TileKind,
    pub default_visibility: DefaultVisibility,
    /// Hardware that must exist for the tile to be shown at all.
    pub requires: Option<Capability>,
    pub confirmation: Confirmation,
    pub live_source: Option<LiveSource>,
}

const fn row(
    kind: ToggleKind,
    token: &'static str,
    tile: TileKind,
    default_visibility: DefaultVisibility,
    requires: Option<Capability>,
    confirmation: Confirmation,
    live_source: Option<LiveSource>,
) -> ToggleDescriptor {
    ToggleDescriptor {
        kind,
        token,
        tile,
        default_visibility,
        requires,
        confirmation,
        live_source,
    }
}

use Confirmation as C;
use DefaultVisibility as V;

/// The catalogue, indexed by `ToggleKind as usize`.
/// Rows are listed in default-order position where they appear in it.
pub static DESCRIPTORS: [ToggleDescriptor; ToggleKind::COUNT] = [
    row(ToggleKind::User, "USER", TileKind::Avatar, V::Shown, None, C::Navigation, None),
    row(ToggleKind::Brightness, "BRIGHTNESS", TileKind::Plain, V::Shown, None, C::Navigation, None),
    row(ToggleKind::Settings, "SETTINGS", TileKind::Plain, V::Shown, None, C::Navigation, None),
    row(ToggleKind::Wifi, "WIFI", TileKind::Wifi, V::Shown, None, C::Polled, Some(LiveSource::Network)),
    row(
        ToggleKind::Signal,
        "SIGNAL",
        TileKind::Signal,
        V::ShownWith(Capability::MobileData),
        None,
        C::Navigation,
        Some(LiveSource::Network),
    ),
    row(
        ToggleKind::Rotate,
        "ROTATE",
        TileKind::Plain,
        V::ShownWith(Capability::RotationLock),
        None,
        C::Notified,
        Some(LiveSource::RotationPolicy),
    ),
    row(ToggleKind::Clock, "CLOCK", TileKind::Plain, V::Hidden, None, C::Navigation, None),
    row(ToggleKind::Gps, "GPS", TileKind::Plain, V::Hidden, None, C::Polled, Some(LiveSource::Location)),
    row(ToggleKind::Ime, "IME", TileKind::Plain, V::Hidden, None, C::Navigation, None),
    row(ToggleKind::Battery, "BATTERY", TileKind::Battery, V::Shown, None, C::Navigation, Some(LiveSource::Battery)),
    row(ToggleKind::Airplane, "AIRPLANE_MODE", TileKind::Plain, V::Shown, None, C::Notified, None),
    row(
        ToggleKind::Bluetooth,
        "BLUETOOTH",
        TileKind::Bluetooth,
        V::ShownWith(Capability::Bluetooth),
        None,
        C::Polled,
        Some(LiveSource::Bluetooth),
    ),
    row(ToggleKind::Vibrate, "VIBRATE", TileKind::Plain, V::Hidden, None, C::Notified, None),
    row(ToggleKind::Silent, "SILENT", TileKind::Plain, V::Hidden, None, C::Notified, None),
    row(
        ToggleKind::FastCharge,
        "FCHARGE",
        TileKind::Plain,
        V::Hidden,
        Some(Capability::FastChargeNode),
        C::FireAndForget,
        None,
    ),
    row(ToggleKind::Sync, "SYNC", TileKind::Plain, V::Hidden, None, C::Polled, None),
    row(ToggleKind::Nfc, "NFC", TileKind::Plain, V::Hidden, Some(Capability::Nfc), C::Polled, None),
    row(
        ToggleKind::Torch,
        "TORCH",
        TileKind::Plain,
        V::Hidden,
        Some(Capability::CameraFlash),
        C::StateMachine,
        None,
    ),
    row(ToggleKind::WifiTether, "WIFITETHER", TileKind::Plain, V::Hidden, None, C::Polled, None),
    row(ToggleKind::UsbTether, "USBTETHER", TileKind::Plain, V::Hidden, None, C::Polled, None),
    row(ToggleKind::TwoG, "2G", TileKind::Plain, V::Hidden, Some(Capability::MobileData), C::Polled, None),
    row(ToggleKind::Lte, "LTE", TileKind::Plain, V::Hidden, Some(Capability::MobileData), C::Polled, None),
    row(ToggleKind::FavContact, "FAVCONTACT", TileKind::Avatar, V::Hidden, None, C::Navigation, None),
    row(ToggleKind::SoundState, "SOUNDSTATE", TileKind::Plain, V::Hidden, None, C::Notified, None),
    row(ToggleKind::RebootMenu, "REBOOTMENU", TileKind::Plain, V::Hidden, None, C::FireAndForget, None),
    row(ToggleKind::QuickRecord, "QUICKRECORD", TileKind::Recorder, V::Hidden, None, C::StateMachine, None),
    row(ToggleKind::Memory, "MEMORY", TileKind::Plain, V::Hidden, None, C::Navigation, None),
    row(ToggleKind::Pie, "PIE", TileKind::Plain, V::Hidden, None, C::Notified, None),
    row(ToggleKind::ExpandedDesktop, "EXPANDED_DESKTOP", TileKind::Plain, V::Hidden, None, C::Notified, None),
];

// ---------------------------------------------------------------------------
// Device capabilities
// ---------------------------------------------------------------------------

/// Platform features queried once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub mobile_data: bool,
    pub rotation_lock: bool,
    pub bluetooth: bool,
    pub camera_flash: bool,
    pub nfc: bool,
    /// Resolved at setup from the configured fast-charge path.
    pub fast_charge_node: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            mobile_data: true,
            rotation_lock: true,
            bluetooth: true,
            camera_flash: true,
            nfc: true,
            fast_charge_node: false,
        }
    }
}

impl DeviceCapabilities {
    pub fn has(&self, cap: Capability) -> bool {
        match cap {
            Capability::MobileData => self.mobile_data,
            Capability::RotationLock => self.rotation_lock,
            Capability::Bluetooth => self.bluetooth,
            Capability::CameraFlash => self.camera_flash,
            Capability::Nfc => self.nfc,
            Capability::FastChargeNode => self.fast_charge_node,
        }
    }

    /// Whether `kind` can be shown on this device at all.
    pub fn supports(&self, kind: ToggleKind) -> bool {
        kind.descriptor().requires.is_none_or(|cap| self.has(cap))
    }

    /// Whether `kind` belongs in the fallback order on this device.
    pub fn shows_by_default(&self, kind: ToggleKind) -> bool {
        match kind.descriptor().default_visibility {
            DefaultVisibility::Hidden => false,
            DefaultVisibility::Shown => true,
            DefaultVisibility::ShownWith(cap) => self.has(cap),
        }
    }
}
