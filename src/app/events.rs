//! Outbound panel events.
//!
//! The [`QuickPanel`](super::service::QuickPanel) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, redraw a view, record them
//! in a test.

use serde::Serialize;

use crate::error::{ActionError, HardwareError, TransitionError};
use crate::fsm::recorder::RecorderState;
use crate::fsm::torch::TorchState;
use crate::order::{PanelLayout, ToggleOrder};
use crate::registry::ToggleKind;
use crate::tiles::TileState;

/// Screens a navigation tile can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Surface {
    UserSettings,
    DisplaySettings,
    Settings,
    WifiSettings,
    MobileNetworkSettings,
    TetherSettings,
    LocationSettings,
    InputMethodPicker,
    BatteryUsage,
    BluetoothSettings,
    DateTime,
    SoundSettings,
    ContactCard,
    ContactPicker,
    RunningApps,
}

/// Structured events emitted by the panel.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// The panel finished setup and is showing `visible` tiles.
    Started { visible: usize },

    /// The visible set or its layout was rebuilt.
    LayoutChanged { order: ToggleOrder, layout: PanelLayout },

    /// A visible tile has new content.
    TileUpdated { kind: ToggleKind, state: TileState },

    /// A gesture asked a state machine for a move it does not allow.
    TransitionRejected(TransitionError),

    /// Hardware could not be acquired or stopped responding.
    HardwareFailed { kind: ToggleKind, error: HardwareError },

    /// An external action was not accepted.
    ActionFailed { kind: ToggleKind, error: ActionError },

    RecorderChanged(RecorderState),

    TorchChanged(TorchState),

    /// A navigation tile wants `Surface` opened.
    LaunchRequested(Surface),

    /// Collapse the panel (after a navigation launch).
    CollapseRequested,

    /// The panel released everything and stopped.
    Stopped,
}
