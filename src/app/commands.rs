//! Inbound commands to the panel.
//!
//! These represent requests from the UI shell or other processes that the
//! [`QuickPanel`](super::service::QuickPanel) interprets and acts upon.
//! Platform notifications do not come through here; they arrive as
//! [`ControlMsg`](crate::events::ControlMsg)s through the inbox.

use crate::fsm::torch::TorchIntent;
use crate::registry::ToggleKind;

/// Commands that external adapters can send into the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    /// Primary gesture on a tile.
    Tap(ToggleKind),

    /// Secondary gesture on a tile.
    LongPress(ToggleKind),

    /// Torch request from another process (widget, lock-screen shortcut).
    Torch(TorchIntent),

    /// Release every held resource and stop reacting.
    Shutdown,
}
