//! Torch (camera flash) state machine.
//!
//! ```text
//!          start()                  preview ready / keyguard locked
//!   Off ───────────▶ Starting ─────────────────────────────────▶ On
//!    ▲                  │  confirm tick (every 100 ms, ≤ 30×)     │
//!    │                  │  budget exhausted → stop() + error      │
//!    └──────────────────┴───────────── stop() ◀───────────────────┘
//! ```
//!
//! The machine owns the hardware flags (wake lock, camera, preview, flash)
//! and is the only code that touches them.  `stop()` releases exactly what
//! is held, in reverse acquisition order, so re-entry from any trigger path
//! (tile, external intent, lock screen, shutdown) ends with the hardware
//! released and the persisted indicator cleared.

use log::{info, warn};
use serde::Serialize;

use super::{Epoch, StateDescriptor};
use crate::app::ports::{CameraPort, KeyguardPort, SettingsStore, WakeLockPort};
use crate::config::PanelConfig;
use crate::error::{Error, HardwareError};
use crate::events::SettingKey;
use crate::registry::ToggleKind;
use crate::tiles::{ExternalValue, RadioState, TileState, render};
use crate::timers::{TimerQueue, TimerTask};

// ---------------------------------------------------------------------------
// States and inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TorchState {
    Off = 0,
    Starting = 1,
    On = 2,
}

impl TorchState {
    pub const COUNT: usize = 3;

    pub fn descriptor(self) -> &'static StateDescriptor<TorchState, TorchIntent> {
        &STATE_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

/// External request to change the torch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchIntent {
    On,
    Off,
    Toggle,
}

/// Indexed by `TorchState as usize`.
static STATE_TABLE: [StateDescriptor<TorchState, TorchIntent>; TorchState::COUNT] = [
    StateDescriptor {
        id: TorchState::Off,
        name: "Off",
        label: "Torch",
        icon: crate::tiles::IconRef("ic_qs_torch_off"),
        on_tap: Some(TorchIntent::On),
        on_long_press: None,
    },
    StateDescriptor {
        id: TorchState::Starting,
        name: "Starting",
        label: "Turning on",
        icon: crate::tiles::IconRef("ic_qs_torch_on"),
        on_tap: Some(TorchIntent::Off),
        on_long_press: None,
    },
    StateDescriptor {
        id: TorchState::On,
        name: "On",
        label: "Torch",
        icon: crate::tiles::IconRef("ic_qs_torch_on"),
        on_tap: Some(TorchIntent::Off),
        on_long_press: None,
    },
];

/// Hardware currently held.  All false while Off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TorchHardware {
    pub wake_lock: bool,
    pub camera: bool,
    pub preview: bool,
    pub flash: bool,
}

impl TorchHardware {
    pub fn any(self) -> bool {
        self.wake_lock || self.camera || self.preview || self.flash
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

pub struct TorchMachine {
    state: TorchState,
    held: TorchHardware,
    epoch: Epoch,
    interval_ms: u32,
    attempts: u8,
    attempts_left: u8,
    last_intent: Option<TorchIntent>,
}

impl TorchMachine {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            state: TorchState::Off,
            held: TorchHardware::default(),
            epoch: Epoch::default(),
            interval_ms: config.torch_confirm_interval_ms,
            attempts: config.torch_confirm_attempts.max(1),
            attempts_left: 0,
            last_intent: None,
        }
    }

    pub fn state(&self) -> TorchState {
        self.state
    }

    pub fn hardware(&self) -> TorchHardware {
        self.held
    }

    /// Off → Starting.  No-op if already Starting or On.
    pub fn start(
        &mut self,
        now_ms: u64,
        timers: &mut TimerQueue,
        hw: &mut (impl CameraPort + WakeLockPort),
        settings: &mut impl SettingsStore,
    ) -> Result<TorchState, Error> {
        if self.state != TorchState::Off {
            return Ok(self.state);
        }

        if let Err(e) = self.acquire(hw) {
            warn!("torch: start failed: {}", e);
            self.stop(timers, hw, settings);
            return Err(e.into());
        }

        self.state = TorchState::Starting;
        self.attempts_left = self.attempts;
        let epoch = self.epoch.bump();
        timers.schedule(now_ms, self.interval_ms, TimerTask::TorchConfirm { epoch });
        info!("torch: Off -> Starting");
        Ok(self.state)
    }

    /// Release everything held and go Off.  Idempotent; performs no
    /// hardware calls when nothing is held.
    pub fn stop(
        &mut self,
        timers: &mut TimerQueue,
        hw: &mut (impl CameraPort + WakeLockPort),
        settings: &mut impl SettingsStore,
    ) -> TorchState {
        timers.cancel_where(|t| matches!(t, TimerTask::TorchConfirm { .. }));
        self.epoch.bump();

        if self.held.flash {
            if let Err(e) = hw.set_flash(false) {
                warn!("torch: flash off failed: {}", e);
            }
            self.held.flash = false;
        }
        if self.held.preview {
            hw.stop_preview();
            self.held.preview = false;
        }
        if self.held.camera {
            hw.release_camera();
            self.held.camera = false;
        }
        // Another client may have set the indicator; clear it regardless.
        if settings.get_bool(SettingKey::TorchState) == Some(true) {
            if let Err(e) = settings.put_bool(SettingKey::TorchState, false) {
                warn!("torch: clearing indicator failed: {}", e);
            }
        }
        if self.held.wake_lock {
            hw.release_wake_lock();
            self.held.wake_lock = false;
        }

        if self.state != TorchState::Off {
            info!("torch: {} -> Off", self.state.name());
        }
        self.state = TorchState::Off;
        self.state
    }

    /// Off → start, otherwise stop.  Also what a tile tap does.
    ///
    /// While Off with the persisted indicator set, the torch is lit by
    /// someone else and the tile shows it on, so toggling turns it off.
    pub fn toggle(
        &mut self,
        now_ms: u64,
        timers: &mut TimerQueue,
        hw: &mut (impl CameraPort + WakeLockPort),
        settings: &mut impl SettingsStore,
    ) -> Result<TorchState, Error> {
        if self.state == TorchState::Off && settings.get_bool(SettingKey::TorchState) == Some(true) {
            info!("torch: indicator set by another client, turning off");
            return Ok(self.stop(timers, hw, settings));
        }
        match self.state.descriptor().on_tap {
            Some(TorchIntent::On) => self.start(now_ms, timers, hw, settings),
            Some(_) => Ok(self.stop(timers, hw, settings)),
            None => Ok(self.state),
        }
    }

    /// External intent.  A repeated On or Off equal to the previous intent
    /// is ignored; Toggle always acts.
    pub fn handle_intent(
        &mut self,
        intent: TorchIntent,
        now_ms: u64,
        timers: &mut TimerQueue,
        hw: &mut (impl CameraPort + WakeLockPort),
        settings: &mut impl SettingsStore,
    ) -> Result<TorchState, Error> {
        let repeated = intent != TorchIntent::Toggle && self.last_intent == Some(intent);
        self.last_intent = Some(intent);
        if repeated {
            info!("torch: repeated {:?} intent ignored", intent);
            return Ok(self.state);
        }
        match intent {
            TorchIntent::On => self.start(now_ms, timers, hw, settings),
            TorchIntent::Off => Ok(self.stop(timers, hw, settings)),
            TorchIntent::Toggle => self.toggle(now_ms, timers, hw, settings),
        }
    }

    /// Readiness check fired.
    pub fn on_confirm_tick(
        &mut self,
        epoch: u32,
        now_ms: u64,
        timers: &mut TimerQueue,
        hw: &mut (impl CameraPort + WakeLockPort + KeyguardPort),
        settings: &mut impl SettingsStore,
    ) -> Result<TorchState, Error> {
        if !self.epoch.matches(epoch) || self.state != TorchState::Starting {
            return Ok(self.state);
        }

        if hw.preview_ready() {
            self.confirm(settings);
            return Ok(self.state);
        }
        if hw.is_locked() {
            // No preview surface behind the lock screen; trust the flash.
            info!("torch: keyguard locked, accepting commanded flash");
            self.confirm(settings);
            return Ok(self.state);
        }

        self.attempts_left = self.attempts_left.saturating_sub(1);
        if self.attempts_left == 0 {
            warn!("torch: not confirmed after {} checks", self.attempts);
            self.stop(timers, hw, settings);
            return Err(HardwareError::TorchNotConfirmed.into());
        }
        timers.schedule(now_ms, self.interval_ms, TimerTask::TorchConfirm { epoch });
        Ok(self.state)
    }

    /// Lock screen shown or dismissed.  Locking while Starting ends the
    /// readiness loop the same way a locked tick does.
    pub fn on_keyguard(
        &mut self,
        locked: bool,
        timers: &mut TimerQueue,
        settings: &mut impl SettingsStore,
    ) -> TorchState {
        if locked && self.state == TorchState::Starting {
            timers.cancel_where(|t| matches!(t, TimerTask::TorchConfirm { .. }));
            self.epoch.bump();
            info!("torch: keyguard locked while starting, accepting commanded flash");
            self.confirm(settings);
        }
        self.state
    }

    /// Tile presentation.  When this machine is Off the persisted indicator
    /// decides, since another client may own the torch.
    pub fn tile_state(&self, persisted_on: bool) -> TileState {
        let radio = match self.state {
            TorchState::Off if persisted_on => RadioState::On,
            TorchState::Off => RadioState::Off,
            TorchState::Starting => RadioState::TurningOn,
            TorchState::On => RadioState::On,
        };
        let mut tile = render(ToggleKind::Torch, &ExternalValue::Radio(radio));
        if self.state != TorchState::Off {
            let d = self.state.descriptor();
            tile.label = String::from(d.label);
            tile.icon = d.icon;
        }
        tile
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn acquire(&mut self, hw: &mut (impl CameraPort + WakeLockPort)) -> Result<(), HardwareError> {
        hw.acquire_wake_lock()?;
        self.held.wake_lock = true;
        hw.open_camera()?;
        self.held.camera = true;
        hw.start_preview()?;
        self.held.preview = true;
        hw.set_flash(true)?;
        self.held.flash = true;
        Ok(())
    }

    fn confirm(&mut self, settings: &mut impl SettingsStore) {
        self.state = TorchState::On;
        if let Err(e) = settings.put_bool(SettingKey::TorchState, true) {
            warn!("torch: setting indicator failed: {}", e);
        }
        info!("torch: Starting -> On");
    }
}
