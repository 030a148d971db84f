//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured panel events to the
//! `log` facade.  A UI shell would implement the same trait and redraw.

use log::{info, warn};

use crate::app::events::PanelEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`PanelEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: usize,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events logged so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &PanelEvent) {
        self.emitted += 1;
        match event {
            PanelEvent::Started { visible } => {
                info!("START | visible={}", visible);
            }
            PanelEvent::LayoutChanged { order, layout } => {
                info!(
                    "LAYOUT | {} | columns={} text={}sp",
                    crate::order::serialize(order),
                    layout.columns,
                    layout.text_size_sp
                );
            }
            PanelEvent::TileUpdated { kind, state } => {
                info!(
                    "TILE | {} | '{}' icon={} on={}",
                    kind,
                    state.label,
                    state.icon.name(),
                    state.enabled
                );
            }
            PanelEvent::TransitionRejected(e) => {
                warn!("REJECT | {}", e);
            }
            PanelEvent::HardwareFailed { kind, error } => {
                warn!("HW | {} | {}", kind, error);
            }
            PanelEvent::ActionFailed { kind, error } => {
                warn!("ACTION | {} | {}", kind, error);
            }
            PanelEvent::RecorderChanged(state) => {
                info!("RECORDER | {}", state.name());
            }
            PanelEvent::TorchChanged(state) => {
                info!("TORCH | {}", state.name());
            }
            PanelEvent::LaunchRequested(surface) => {
                info!("LAUNCH | {:?}", surface);
            }
            PanelEvent::CollapseRequested => {
                info!("COLLAPSE");
            }
            PanelEvent::Stopped => {
                info!("STOP");
            }
        }
    }
}
