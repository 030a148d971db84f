//! Cross-thread control messages.
//!
//! Messages are produced by:
//! - the settings store (key changed)
//! - platform notification adapters (radio, Bluetooth, user switch, keyguard)
//! - background workers (profile lookups, recording-file checks)
//! - media callbacks (playback completion)
//!
//! They are consumed by the control thread, which drains the inbox and feeds
//! each message to the panel one at a time in FIFO order.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Settings store   │────▶│              │     │              │
//! │ Notifications    │────▶│    Inbox     │────▶│ Control      │
//! │ Background work  │────▶│  (bounded)   │     │ thread       │
//! │ Media callbacks  │────▶│              │     │              │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::registry::ToggleKind;
use crate::tiles::ExternalValue;

// ── Settings keys ─────────────────────────────────────────────

/// Keys the panel reads from, writes to, or watches in the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Pipe-delimited toggle order.
    QuickToggles,
    /// Columns per row.
    QuickTogglesPerRow,
    /// Lookup key of the favourite contact.
    QuickToggleFavContact,
    /// Persisted torch indicator.
    TorchState,
    /// Ringer mode (0 silent, 1 vibrate, 2 normal).
    ModeRinger,
    /// Pie controls enabled (0/1).
    PieControls,
    /// Expanded desktop enabled (0/1).
    ExpandedDesktopState,
    /// Last fast-charge value written.
    FastChargeLast,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        Self::QuickToggles,
        Self::QuickTogglesPerRow,
        Self::QuickToggleFavContact,
        Self::TorchState,
        Self::ModeRinger,
        Self::PieControls,
        Self::ExpandedDesktopState,
        Self::FastChargeLast,
    ];

    /// Name under which the key is stored.
    pub fn name(self) -> &'static str {
        match self {
            Self::QuickToggles => "quick_toggles",
            Self::QuickTogglesPerRow => "quick_toggles_per_row",
            Self::QuickToggleFavContact => "quick_toggle_fav_contact",
            Self::TorchState => "torch_state",
            Self::ModeRinger => "mode_ringer",
            Self::PieControls => "pie_controls",
            Self::ExpandedDesktopState => "expanded_desktop_state",
            Self::FastChargeLast => "fast_charge_last",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Whether a change to this key rebuilds the panel.
    pub fn triggers_reconfigure(self) -> bool {
        matches!(
            self,
            Self::QuickToggles | Self::QuickTogglesPerRow | Self::QuickToggleFavContact
        )
    }
}

// ── Messages ──────────────────────────────────────────────────

/// Profile data resolved by a background lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: String,
    pub image: Option<String>,
}

/// Everything that can reach the control thread from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMsg {
    /// A settings key changed.
    SettingsChanged { key: SettingKey },
    /// Authoritative state report for one toggle.
    ExternalStateChanged { kind: ToggleKind, value: ExternalValue },
    /// Bluetooth adapter switched on or off.
    BluetoothAdapterChanged { enabled: bool },
    /// Bluetooth device connected or disconnected.
    BluetoothConnectionChanged { connected: bool },
    /// Wireless display status changed.
    DisplayMirroringChanged { active: bool },
    /// Foreground user switched.
    UserSwitched,
    /// Current user's profile was edited.
    ProfileChanged,
    /// Result of a current-user lookup.
    UserInfoLoaded { generation: u32, info: ProfileInfo },
    /// Result of a favourite-contact lookup; `None` if the key did not resolve.
    FavContactLoaded { generation: u32, info: Option<ProfileInfo> },
    /// Result of a recording-file existence check, tagged with the recorder
    /// epoch at the time the check was started.
    RecordingFileChecked { epoch: u32, exists: bool },
    /// Media player finished the quick recording.
    PlaybackCompleted,
    /// Lock screen shown or dismissed.
    KeyguardChanged { locked: bool },
}

// ── Inbox ─────────────────────────────────────────────────────

/// Channel depth for inbound control messages.
pub const INBOX_DEPTH: usize = 32;

/// Bounded multi-producer queue into the control thread.
///
/// Producers on any thread call [`post`](Self::post); only the control
/// thread drains.  Shared between threads behind an `Arc`.
///
/// A full inbox drops the message and raises the overflow flag.  The
/// consumer clears it with [`take_overflow`](Self::take_overflow) and must
/// then resynchronise from the settings store, since any message may have
/// been lost.
pub struct Inbox {
    channel: Channel<CriticalSectionRawMutex, ControlMsg, INBOX_DEPTH>,
    overflowed: AtomicBool,
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            overflowed: AtomicBool::new(false),
        }
    }

    /// Enqueue a message.  Returns `false` if the inbox is full (message dropped).
    pub fn post(&self, msg: ControlMsg) -> bool {
        match self.channel.try_send(msg) {
            Ok(()) => true,
            Err(_) => {
                if !self.overflowed.swap(true, Ordering::AcqRel) {
                    warn!("inbox: full, dropping messages until drained");
                }
                false
            }
        }
    }

    /// Whether a message was dropped since the last call.  Clears the flag.
    pub fn take_overflow(&self) -> bool {
        self.overflowed.swap(false, Ordering::AcqRel)
    }

    /// Dequeue the next message, if any.
    pub fn pop(&self) -> Option<ControlMsg> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending messages into `handler` in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(ControlMsg)) {
        while let Some(msg) = self.pop() {
            handler(msg);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}
