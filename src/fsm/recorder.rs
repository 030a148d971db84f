//! Quick-record / playback state machine.
//!
//! ```text
//!                 start                     stop / auto-stop
//!   Idle ─────────────────▶ Recording ─────────────────▶ JustRecorded
//!    ▲ ▲                      ▲   ▲                          │  │
//!    │ │     revert timer     │   │ start                    │  │ play
//!    │ └──────────────────────┼───┼──────────────────────────┘  │
//!    │                        │   │                             ▼
//!    │   stop / completion    │ NoRecording ◀── file missing  Playing
//!    └────────────────────────┼─────────────────────────────────┘
//!                             │ start (also from JustRecorded)
//! ```
//!
//! Single global instance.  The recorder or player is held only while in
//! `Recording` or `Playing` respectively.

use log::{info, warn};
use serde::Serialize;

use super::{Epoch, StateDescriptor};
use crate::app::ports::RecorderPort;
use crate::config::PanelConfig;
use crate::error::{Error, TransitionError};
use crate::tiles::{IconRef, TilePayload, TileState};
use crate::timers::{TimerQueue, TimerTask};

// ---------------------------------------------------------------------------
// States and inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum RecorderState {
    Idle = 0,
    Recording = 1,
    JustRecorded = 2,
    Playing = 3,
    NoRecording = 4,
}

impl RecorderState {
    pub const COUNT: usize = 5;

    pub fn descriptor(self) -> &'static StateDescriptor<RecorderState, RecorderInput> {
        &STATE_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

/// What the user (or a tile gesture) asks the machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderInput {
    Start,
    Stop,
    Play,
}

const fn row(
    id: RecorderState,
    name: &'static str,
    label: &'static str,
    icon: &'static str,
    on_tap: Option<RecorderInput>,
    on_long_press: Option<RecorderInput>,
) -> StateDescriptor<RecorderState, RecorderInput> {
    StateDescriptor {
        id,
        name,
        label,
        icon: IconRef(icon),
        on_tap,
        on_long_press,
    }
}

use RecorderInput as In;

/// Indexed by `RecorderState as usize`.
static STATE_TABLE: [StateDescriptor<RecorderState, RecorderInput>; RecorderState::COUNT] = [
    row(RecorderState::Idle, "Idle", "Quick record", "ic_qs_quickrecord", Some(In::Play), Some(In::Start)),
    row(RecorderState::Recording, "Recording", "Recording", "ic_qs_recording", Some(In::Stop), None),
    row(
        RecorderState::JustRecorded,
        "JustRecorded",
        "Recording saved",
        "ic_qs_saved",
        Some(In::Play),
        Some(In::Start),
    ),
    row(RecorderState::Playing, "Playing", "Playing", "ic_qs_playing", Some(In::Stop), None),
    row(RecorderState::NoRecording, "NoRecording", "No file", "ic_qs_quickrecord", None, Some(In::Start)),
];

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// The quick-record machine.
pub struct RecorderMachine {
    state: RecorderState,
    epoch: Epoch,
    path: String,
    auto_stop_ms: u32,
    revert_ms: u32,
    recorder_held: bool,
    player_held: bool,
}

impl RecorderMachine {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            state: RecorderState::Idle,
            epoch: Epoch::default(),
            path: config.quick_record_path.clone(),
            auto_stop_ms: config.record_auto_stop_ms,
            revert_ms: config.record_revert_ms,
            recorder_held: false,
            player_held: false,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current transition epoch.  Background checks echo it back so a
    /// result that predates a transition can be recognised.
    pub fn epoch(&self) -> u32 {
        self.epoch.current()
    }

    /// Whether the recorder or player is currently held.
    pub fn holds_resources(&self) -> bool {
        self.recorder_held || self.player_held
    }

    /// Idle | JustRecorded | NoRecording → Recording.
    pub fn start(
        &mut self,
        now_ms: u64,
        timers: &mut TimerQueue,
        port: &mut impl RecorderPort,
    ) -> Result<RecorderState, Error> {
        match self.state {
            RecorderState::Idle | RecorderState::JustRecorded | RecorderState::NoRecording => {}
            _ => return Err(self.reject("start")),
        }

        port.start_recording(&self.path).map_err(|e| {
            warn!("recorder: start failed: {}", e);
            Error::from(e)
        })?;
        self.recorder_held = true;

        let epoch = self.enter(RecorderState::Recording, timers);
        timers.schedule(now_ms, self.auto_stop_ms, TimerTask::RecorderAutoStop { epoch });
        Ok(self.state)
    }

    /// Recording → JustRecorded, or Playing → Idle.
    pub fn stop(
        &mut self,
        now_ms: u64,
        timers: &mut TimerQueue,
        port: &mut impl RecorderPort,
    ) -> Result<RecorderState, Error> {
        match self.state {
            RecorderState::Recording => {
                self.release(port);
                let epoch = self.enter(RecorderState::JustRecorded, timers);
                timers.schedule(now_ms, self.revert_ms, TimerTask::RecorderRevert { epoch });
            }
            RecorderState::Playing => {
                self.release(port);
                self.enter(RecorderState::Idle, timers);
            }
            _ => return Err(self.reject("stop")),
        }
        Ok(self.state)
    }

    /// Idle | JustRecorded → Playing.
    pub fn play(&mut self, timers: &mut TimerQueue, port: &mut impl RecorderPort) -> Result<RecorderState, Error> {
        match self.state {
            RecorderState::Idle | RecorderState::JustRecorded => {}
            _ => return Err(self.reject("play")),
        }

        port.start_playback(&self.path).map_err(|e| {
            warn!("recorder: playback failed: {}", e);
            Error::from(e)
        })?;
        self.player_held = true;
        self.enter(RecorderState::Playing, timers);
        Ok(self.state)
    }

    /// Auto-stop timer fired.  Returns `true` if it stopped a recording.
    pub fn on_auto_stop(
        &mut self,
        epoch: u32,
        now_ms: u64,
        timers: &mut TimerQueue,
        port: &mut impl RecorderPort,
    ) -> bool {
        if !self.epoch.matches(epoch) || self.state != RecorderState::Recording {
            return false;
        }
        info!("recorder: auto-stop after {} ms", self.auto_stop_ms);
        self.stop(now_ms, timers, port).is_ok()
    }

    /// Revert timer fired.  Returns `true` if the machine went back to Idle.
    pub fn on_revert(&mut self, epoch: u32, timers: &mut TimerQueue) -> bool {
        if !self.epoch.matches(epoch) || self.state != RecorderState::JustRecorded {
            return false;
        }
        self.enter(RecorderState::Idle, timers);
        true
    }

    /// Media player reported completion.  Returns `true` if it ended playback.
    pub fn playback_completed(&mut self, timers: &mut TimerQueue, port: &mut impl RecorderPort) -> bool {
        if self.state != RecorderState::Playing {
            return false;
        }
        self.release(port);
        self.enter(RecorderState::Idle, timers);
        true
    }

    /// The backing file is gone: release everything and show NoRecording.
    pub fn file_missing(&mut self, timers: &mut TimerQueue, port: &mut impl RecorderPort) {
        if self.state == RecorderState::NoRecording {
            return;
        }
        self.release(port);
        self.enter(RecorderState::NoRecording, timers);
    }

    /// The backing file exists again.  Only clears NoRecording.
    pub fn file_found(&mut self, timers: &mut TimerQueue) -> bool {
        if self.state != RecorderState::NoRecording {
            return false;
        }
        self.enter(RecorderState::Idle, timers);
        true
    }

    /// Dispatch an input through the transition methods.
    pub fn handle(
        &mut self,
        input: RecorderInput,
        now_ms: u64,
        timers: &mut TimerQueue,
        port: &mut impl RecorderPort,
    ) -> Result<RecorderState, Error> {
        match input {
            RecorderInput::Start => self.start(now_ms, timers, port),
            RecorderInput::Stop => self.stop(now_ms, timers, port),
            RecorderInput::Play => self.play(timers, port),
        }
    }

    /// Input a tap maps to in the current state.
    pub fn tap_input(&self) -> Option<RecorderInput> {
        self.state.descriptor().on_tap
    }

    /// Input a long-press maps to in the current state.
    pub fn long_press_input(&self) -> Option<RecorderInput> {
        self.state.descriptor().on_long_press
    }

    /// Tile presentation for the current state.
    pub fn tile_state(&self) -> TileState {
        let d = self.state.descriptor();
        TileState {
            label: String::from(d.label),
            icon: d.icon,
            enabled: matches!(self.state, RecorderState::Recording | RecorderState::Playing),
            payload: TilePayload::Recorder { state: self.state },
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Move to `next`, invalidate pending recorder timers, return the new epoch.
    fn enter(&mut self, next: RecorderState, timers: &mut TimerQueue) -> u32 {
        info!("recorder: {} -> {}", self.state.name(), next.name());
        timers.cancel_where(|t| {
            matches!(t, TimerTask::RecorderAutoStop { .. } | TimerTask::RecorderRevert { .. })
        });
        self.state = next;
        self.epoch.bump()
    }

    fn release(&mut self, port: &mut impl RecorderPort) {
        if self.recorder_held {
            port.stop_recording();
            self.recorder_held = false;
        }
        if self.player_held {
            port.stop_playback();
            self.player_held = false;
        }
    }

    fn reject(&self, action: &'static str) -> Error {
        warn!("recorder: '{}' rejected in {}", action, self.state.name());
        TransitionError::new("recorder", self.state.name(), action).into()
    }
}
