//! Panel service: the hexagonal core.
//!
//! [`QuickPanel`] owns the tile store, the reconciliation scheduler, the
//! change watcher and both state machines.  It exposes a clean,
//! platform-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire panel testable with mock adapters.
//!
//! ```text
//!  PanelCommand ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!  ControlMsg   ──▶ │          QuickPanel          │
//!  advance(now) ──▶ │ store · scheduler · watcher  │ ──▶ ActionPort / Camera /
//!                   │ recorder · torch · timers    │     Recorder / Shell / ...
//!                   └─────────────────────────────┘
//! ```
//!
//! Visible tiles get a refresh callback on the store that queues the new
//! state; every entry point flushes that queue to the sink as
//! [`PanelEvent::TileUpdated`] before returning.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::PanelConfig;
use crate::error::Error;
use crate::events::{ControlMsg, Inbox, ProfileInfo, SettingKey};
use crate::fsm::recorder::{RecorderInput, RecorderMachine, RecorderState};
use crate::fsm::torch::{TorchHardware, TorchMachine, TorchState};
use crate::order::{PanelLayout, ToggleOrder, ToggleOrderConfig};
use crate::reconcile::ReconciliationScheduler;
use crate::registry::{Confirmation, DeviceCapabilities, ToggleKind};
use crate::tiles::{CallbackHandle, ExternalValue, RadioState, RingerMode, TileState, TileStateStore, render};
use crate::timers::{TimerQueue, TimerTask};
use crate::watcher::{SettingsChangeWatcher, Trigger};

use super::commands::PanelCommand;
use super::events::{PanelEvent, Surface};
use super::ports::{
    BroadcastCommand, ConfigPort, DevicePorts, EventSink, PanelAction, SettingsStore,
};

type PendingUpdates = Rc<RefCell<Vec<(ToggleKind, TileState)>>>;

// ───────────────────────────────────────────────────────────────
// Snapshot
// ───────────────────────────────────────────────────────────────

/// One visible tile in a [`PanelSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct TileSnapshot {
    pub kind: ToggleKind,
    pub state: TileState,
}

/// Point-in-time view of the panel, suitable for logging or a UI shell.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub layout: PanelLayout,
    pub tiles: Vec<TileSnapshot>,
    pub recorder: RecorderState,
    pub torch: TorchState,
    pub torch_hardware: TorchHardware,
    pub recording_present: bool,
    pub pending_confirmations: Vec<ToggleKind>,
    pub display_mirroring: bool,
}

// ───────────────────────────────────────────────────────────────
// QuickPanel
// ───────────────────────────────────────────────────────────────

/// The panel orchestrates all reconciliation logic.
pub struct QuickPanel {
    config: PanelConfig,
    caps: DeviceCapabilities,
    order_config: ToggleOrderConfig,
    order: ToggleOrder,
    layout: PanelLayout,

    store: TileStateStore,
    handles: [Option<CallbackHandle>; ToggleKind::COUNT],
    pending: PendingUpdates,

    timers: TimerQueue,
    scheduler: ReconciliationScheduler,
    watcher: SettingsChangeWatcher,
    recorder: RecorderMachine,
    torch: TorchMachine,
    last_recorder: RecorderState,
    last_torch: TorchState,
    last_torch_indicator: bool,

    profile_generation: u32,
    user: Option<ProfileInfo>,
    fav_contact: Option<ProfileInfo>,
    recording_present: bool,

    started: bool,
    stopped: bool,
}

impl QuickPanel {
    /// Construct the panel from configuration and device capabilities.
    ///
    /// Shows nothing until [`start`](Self::start) is called.
    pub fn new(config: PanelConfig, caps: DeviceCapabilities) -> Self {
        let layout = PanelLayout::from_columns(config.default_columns);
        let scheduler = ReconciliationScheduler::new(&config);
        let recorder = RecorderMachine::new(&config);
        let torch = TorchMachine::new(&config);
        Self {
            caps,
            order_config: ToggleOrderConfig::new(caps),
            order: ToggleOrder::new(),
            layout,
            store: TileStateStore::new(),
            handles: [None; ToggleKind::COUNT],
            pending: Rc::new(RefCell::new(Vec::new())),
            timers: TimerQueue::new(),
            scheduler,
            watcher: SettingsChangeWatcher::new(),
            last_recorder: recorder.state(),
            last_torch: torch.state(),
            last_torch_indicator: false,
            recorder,
            torch,
            profile_generation: 0,
            user: None,
            fav_contact: None,
            recording_present: true,
            started: false,
            stopped: false,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Resolve hardware availability, restore persisted toggles and build
    /// the visible set.
    pub fn start(
        &mut self,
        now_ms: u64,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        if self.started {
            warn!("panel: start called twice");
            return;
        }
        self.started = true;

        // Fast charge is checked once; a missing node hides the tile for
        // the lifetime of the panel.
        let node = self.fast_charge_path().is_some_and(|p| dev.exists(p));
        self.caps.fast_charge_node = node;
        self.order_config = ToggleOrderConfig::new(self.caps);
        if node {
            if let Some(on) = settings.get_bool(SettingKey::FastChargeLast) {
                info!("panel: restoring fast charge = {}", on);
                self.write_fast_charge(on, dev, sink);
            }
        }

        self.reconfigure(settings, dev, sink);
        sink.emit(&PanelEvent::Started {
            visible: self.order.len(),
        });
        info!("panel: started with {} tiles", self.order.len());
        self.finish(settings, sink);
    }

    // ── Commands ──────────────────────────────────────────────

    /// Process a gesture or external request.
    pub fn handle_command(
        &mut self,
        cmd: PanelCommand,
        now_ms: u64,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        if self.stopped {
            debug!("panel: {:?} after shutdown ignored", cmd);
            return;
        }
        match cmd {
            PanelCommand::Tap(kind) => {
                if self.is_visible(kind) {
                    self.tap(kind, now_ms, settings, dev, sink);
                } else {
                    debug!("panel: tap on hidden tile {} ignored", kind);
                }
            }
            PanelCommand::LongPress(kind) => {
                if self.is_visible(kind) {
                    self.long_press(kind, now_ms, dev, sink);
                } else {
                    debug!("panel: long-press on hidden tile {} ignored", kind);
                }
            }
            PanelCommand::Torch(intent) => {
                if let Err(e) = self.torch.handle_intent(intent, now_ms, &mut self.timers, dev, settings) {
                    Self::report(ToggleKind::Torch, e, sink);
                }
            }
            PanelCommand::Shutdown => {
                self.shutdown(now_ms, settings, dev, sink);
                return;
            }
        }
        self.finish(settings, sink);
    }

    // ── Messages ──────────────────────────────────────────────

    /// Process one inbound message on the control thread.
    pub fn handle_message(
        &mut self,
        msg: ControlMsg,
        now_ms: u64,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        if self.stopped {
            return;
        }
        debug!("panel: t={} {:?}", now_ms, msg);
        match self.watcher.translate(msg) {
            Trigger::Reconfigure => self.reconfigure(settings, dev, sink),
            Trigger::Authoritative { kind, value } => {
                if kind.descriptor().confirmation == Confirmation::StateMachine {
                    debug!("panel: external report for {} ignored, machine owns it", kind);
                } else {
                    self.scheduler.on_authoritative(kind, &value, &mut self.timers, &self.store);
                }
            }
            Trigger::Refresh(kinds) => {
                for kind in kinds {
                    self.refresh_tile(*kind, settings, dev);
                }
            }
            Trigger::ReloadProfiles => self.reload_profiles(settings, dev),
            Trigger::UserInfo { generation, info } => {
                if generation == self.profile_generation {
                    self.user = Some(info);
                    self.refresh_tile(ToggleKind::User, settings, dev);
                } else {
                    debug!("panel: stale user lookup (gen {}) dropped", generation);
                }
            }
            Trigger::FavContact { generation, info } => {
                if generation == self.profile_generation {
                    self.fav_contact = info;
                    self.refresh_tile(ToggleKind::FavContact, settings, dev);
                } else {
                    debug!("panel: stale contact lookup (gen {}) dropped", generation);
                }
            }
            Trigger::RecordingFile { epoch, exists } => {
                if epoch != self.recorder.epoch() {
                    debug!("panel: stale recording check (epoch {}) dropped", epoch);
                } else {
                    self.recording_present = exists;
                    if exists {
                        self.recorder.file_found(&mut self.timers);
                    } else {
                        self.recorder.file_missing(&mut self.timers, dev);
                    }
                }
            }
            Trigger::PlaybackCompleted => {
                self.recorder.playback_completed(&mut self.timers, dev);
            }
            Trigger::Keyguard { locked } => {
                self.torch.on_keyguard(locked, &mut self.timers, settings);
            }
            Trigger::Ignore => {}
        }
        self.finish(settings, sink);
    }

    /// Drain the inbox in FIFO order.  Returns the number of messages handled,
    /// counting a resynchronisation after an overflow as one.
    pub fn drain_inbox(
        &mut self,
        inbox: &Inbox,
        now_ms: u64,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Some(msg) = inbox.pop() {
            self.handle_message(msg, now_ms, settings, dev, sink);
            handled += 1;
        }
        if inbox.take_overflow() && !self.stopped {
            // Lost messages cannot be replayed; rebuild from the store.
            warn!("panel: inbox overflowed, resynchronising from settings");
            self.reconfigure(settings, dev, sink);
            self.finish(settings, sink);
            handled += 1;
        }
        handled
    }

    // ── Timers ────────────────────────────────────────────────

    /// Run every timer task due at `now_ms`, earliest first.
    pub fn advance(
        &mut self,
        now_ms: u64,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        if self.stopped {
            return;
        }
        while let Some(task) = self.timers.pop_due(now_ms) {
            match task {
                TimerTask::ReconcileTick { kind, generation } => {
                    self.scheduler
                        .on_tick(kind, generation, now_ms, &mut self.timers, dev, &self.store);
                }
                TimerTask::RecorderAutoStop { epoch } => {
                    self.recorder.on_auto_stop(epoch, now_ms, &mut self.timers, dev);
                }
                TimerTask::RecorderRevert { epoch } => {
                    self.recorder.on_revert(epoch, &mut self.timers);
                }
                TimerTask::TorchConfirm { epoch } => {
                    if let Err(e) = self.torch.on_confirm_tick(epoch, now_ms, &mut self.timers, dev, settings) {
                        Self::report(ToggleKind::Torch, e, sink);
                    }
                }
                TimerTask::TileRefresh(kind) => self.refresh_tile(kind, settings, dev),
            }
        }
        self.finish(settings, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Visible tiles in display order.
    pub fn order(&self) -> &ToggleOrder {
        &self.order
    }

    pub fn is_visible(&self, kind: ToggleKind) -> bool {
        self.order.contains(kind)
    }

    /// Visible tiles with their current state.
    pub fn visible_tiles(&self) -> Vec<(ToggleKind, TileState)> {
        self.order.iter().map(|k| (k, self.store.get(k))).collect()
    }

    pub fn store(&self) -> &TileStateStore {
        &self.store
    }

    pub fn layout(&self) -> PanelLayout {
        self.layout
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.caps
    }

    /// Handle of the panel's own refresh callback for `kind`, if visible.
    pub fn callback_handle(&self, kind: ToggleKind) -> Option<CallbackHandle> {
        self.handles[kind.index()]
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    pub fn torch_state(&self) -> TorchState {
        self.torch.state()
    }

    pub fn torch_hardware(&self) -> TorchHardware {
        self.torch.hardware()
    }

    pub fn recording_present(&self) -> bool {
        self.recording_present
    }

    pub fn is_confirming(&self, kind: ToggleKind) -> bool {
        self.scheduler.is_pending(kind)
    }

    /// Earliest pending timer deadline.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Persist the live configuration.  Returns `true` on success.
    pub fn save_config(&self, storage: &impl ConfigPort) -> bool {
        match storage.save(&self.config) {
            Ok(()) => {
                info!("panel: config saved");
                true
            }
            Err(e) => {
                warn!("panel: config save failed: {}", e);
                false
            }
        }
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            layout: self.layout,
            tiles: self
                .visible_tiles()
                .into_iter()
                .map(|(kind, state)| TileSnapshot { kind, state })
                .collect(),
            recorder: self.recorder.state(),
            torch: self.torch.state(),
            torch_hardware: self.torch.hardware(),
            recording_present: self.recording_present,
            pending_confirmations: ToggleKind::ALL
                .iter()
                .copied()
                .filter(|k| self.scheduler.is_pending(*k))
                .collect(),
            display_mirroring: self.watcher.display_mirroring(),
        }
    }

    // ── Internal: configuration ───────────────────────────────

    /// Re-read order and layout, attach callbacks for new tiles and detach
    /// removed ones.  Tiles present before and after keep their callbacks.
    fn reconfigure(
        &mut self,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        let raw = settings.get_string(SettingKey::QuickToggles);
        let caps = self.caps;
        let mut order = self.order_config.parse(raw.as_deref()).filtered(|k| caps.supports(k));
        if order.is_empty() {
            warn!("panel: no supported toggles in order, using default");
            order = self.order_config.default_order();
        }

        let columns = settings
            .get_int(SettingKey::QuickTogglesPerRow)
            .and_then(|c| u8::try_from(c).ok())
            .filter(|c| *c > 0)
            .unwrap_or(self.config.default_columns);
        let layout = PanelLayout::from_columns(columns);

        let changed = order != self.order || layout != self.layout || !self.handles.iter().any(Option::is_some);

        for kind in ToggleKind::ALL {
            let want = order.contains(kind);
            match (self.handles[kind.index()], want) {
                (Some(handle), false) => {
                    self.store.deregister(handle);
                    self.handles[kind.index()] = None;
                    self.scheduler.cancel(kind, &mut self.timers);
                    debug!("panel: {} removed", kind);
                }
                (None, true) => self.attach(kind),
                _ => {}
            }
        }

        self.order = order;
        self.layout = layout;
        self.watcher.resubscribe(&self.order);

        self.reload_profiles(settings, dev);
        // Recording or playback owns the file until it finishes.
        if self.is_visible(ToggleKind::QuickRecord) && !self.recorder.holds_resources() {
            dev.spawn_file_check(String::from(self.recorder.path()), self.recorder.epoch());
        }
        for kind in ToggleKind::ALL {
            if self.is_visible(kind) {
                self.refresh_tile(kind, settings, dev);
            }
        }

        if changed {
            info!(
                "panel: layout {} tiles, {} columns",
                self.order.len(),
                self.layout.columns
            );
            sink.emit(&PanelEvent::LayoutChanged {
                order: self.order.clone(),
                layout: self.layout,
            });
        }
    }

    fn attach(&mut self, kind: ToggleKind) {
        let pending = Rc::clone(&self.pending);
        let handle = self.store.register(kind, move |k: ToggleKind, s: &TileState| {
            pending.borrow_mut().push((k, s.clone()));
        });
        self.handles[kind.index()] = Some(handle);
    }

    /// Bump the lookup generation and start lookups for visible avatars.
    fn reload_profiles(&mut self, settings: &impl SettingsStore, dev: &mut impl DevicePorts) {
        self.profile_generation = self.profile_generation.wrapping_add(1);
        let generation = self.profile_generation;
        if self.is_visible(ToggleKind::User) {
            dev.spawn_user_lookup(generation);
        }
        if self.is_visible(ToggleKind::FavContact) {
            let key = settings
                .get_string(SettingKey::QuickToggleFavContact)
                .filter(|k| !k.is_empty());
            dev.spawn_fav_contact_lookup(generation, key);
        }
    }

    // ── Internal: gestures ────────────────────────────────────

    fn tap(
        &mut self,
        kind: ToggleKind,
        now_ms: u64,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        let on = !self.store.get(kind).enabled;
        match kind {
            ToggleKind::Torch => {
                if let Err(e) = self.torch.toggle(now_ms, &mut self.timers, dev, settings) {
                    Self::report(kind, e, sink);
                }
            }
            ToggleKind::QuickRecord => match self.recorder.tap_input() {
                Some(RecorderInput::Play) if !dev.exists(self.recorder.path()) => {
                    info!("panel: recording file gone, nothing to play");
                    self.recording_present = false;
                    self.recorder.file_missing(&mut self.timers, dev);
                }
                Some(input) => self.run_recorder(input, now_ms, dev, sink),
                None => debug!("panel: quick record tap ignored in {}", self.recorder.state().name()),
            },
            ToggleKind::FastCharge => {
                if self.write_fast_charge(on, dev, sink) {
                    if let Err(e) = settings.put_bool(SettingKey::FastChargeLast, on) {
                        warn!("panel: persisting fast charge failed: {}", e);
                    }
                    self.timers.schedule(
                        now_ms,
                        self.config.fast_charge_refresh_ms,
                        TimerTask::TileRefresh(ToggleKind::FastCharge),
                    );
                }
            }
            ToggleKind::RebootMenu => {
                self.perform(kind, PanelAction::Broadcast(BroadcastCommand::RebootMenu), dev, sink);
                sink.emit(&PanelEvent::CollapseRequested);
            }
            ToggleKind::Vibrate => {
                self.perform(kind, PanelAction::Broadcast(BroadcastCommand::ToggleVibrate), dev, sink);
            }
            ToggleKind::Silent => {
                self.perform(kind, PanelAction::Broadcast(BroadcastCommand::ToggleSilent), dev, sink);
            }
            ToggleKind::SoundState => {
                let next = Self::ringer(settings).next();
                self.perform(kind, PanelAction::SetRingerMode(next), dev, sink);
            }
            ToggleKind::Pie | ToggleKind::ExpandedDesktop => {
                let key = Self::setting_for(kind);
                if let Err(e) = settings.put_bool(key, on) {
                    warn!("panel: writing {} failed: {}", key.name(), e);
                }
            }
            _ => {
                if let Some(action) = switch_action(kind, on) {
                    self.switch(kind, on, action, now_ms, dev, sink);
                } else if let Some(surface) = tap_surface(kind, self.fav_contact.is_some()) {
                    sink.emit(&PanelEvent::LaunchRequested(surface));
                    sink.emit(&PanelEvent::CollapseRequested);
                }
            }
        }
    }

    fn long_press(&mut self, kind: ToggleKind, now_ms: u64, dev: &mut impl DevicePorts, sink: &mut impl EventSink) {
        if kind == ToggleKind::QuickRecord {
            match self.recorder.long_press_input() {
                Some(input) => self.run_recorder(input, now_ms, dev, sink),
                None => debug!("panel: quick record long-press ignored in {}", self.recorder.state().name()),
            }
            return;
        }
        if let Some(surface) = long_press_surface(kind) {
            sink.emit(&PanelEvent::LaunchRequested(surface));
            sink.emit(&PanelEvent::CollapseRequested);
        }
    }

    /// Flip a switch-style toggle through its action, then confirm.
    fn switch(
        &mut self,
        kind: ToggleKind,
        on: bool,
        action: PanelAction,
        now_ms: u64,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        // Wi-Fi and the hotspot cannot both be on.
        if on {
            if let Some(other) = exclusive_with(kind) {
                let other_on = dev.poll(other).is_some_and(|v| v.is_on());
                if other_on {
                    if let Some(off) = switch_action(other, false) {
                        info!("panel: turning {} off before {}", other, kind);
                        if self.perform(other, off, dev, sink) {
                            self.confirm(other, false, now_ms);
                        }
                    }
                }
            }
        }

        if self.perform(kind, action, dev, sink) {
            self.confirm(kind, on, now_ms);
        }
    }

    /// Show the transitional state and start polling if the kind needs it.
    fn confirm(&mut self, kind: ToggleKind, on: bool, now_ms: u64) {
        if kind.descriptor().confirmation != Confirmation::Polled {
            return;
        }
        let pending = if on { RadioState::TurningOn } else { RadioState::TurningOff };
        self.store.update(kind, render(kind, &ExternalValue::Radio(pending)));
        self.scheduler.request_confirmation(kind, now_ms, &mut self.timers);
    }

    fn perform(
        &mut self,
        kind: ToggleKind,
        action: PanelAction,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) -> bool {
        match dev.perform(action) {
            Ok(()) => {
                debug!("panel: {:?} sent for {}", action, kind);
                true
            }
            Err(e) => {
                Self::report(kind, e.into(), sink);
                false
            }
        }
    }

    fn run_recorder(&mut self, input: RecorderInput, now_ms: u64, dev: &mut impl DevicePorts, sink: &mut impl EventSink) {
        match self.recorder.handle(input, now_ms, &mut self.timers, dev) {
            Ok(RecorderState::JustRecorded) => self.recording_present = true,
            Ok(_) => {}
            Err(e) => Self::report(ToggleKind::QuickRecord, e, sink),
        }
    }

    // ── Internal: fast charge ─────────────────────────────────

    fn fast_charge_path(&self) -> Option<&str> {
        self.config.fast_charge_path.as_deref().filter(|p| !p.is_empty())
    }

    fn write_fast_charge(&self, on: bool, dev: &mut impl DevicePorts, sink: &mut impl EventSink) -> bool {
        let Some(path) = self.fast_charge_path() else {
            return false;
        };
        match dev.write_node(path, if on { "1" } else { "0" }) {
            Ok(()) => true,
            Err(e) => {
                Self::report(ToggleKind::FastCharge, e.into(), sink);
                false
            }
        }
    }

    // ── Internal: refresh ─────────────────────────────────────

    /// Re-read one tile from wherever its state lives.
    fn refresh_tile(&mut self, kind: ToggleKind, settings: &impl SettingsStore, dev: &mut impl DevicePorts) {
        let state = match kind {
            ToggleKind::Torch => {
                let persisted = settings.get_bool(SettingKey::TorchState).unwrap_or(false);
                self.last_torch_indicator = persisted;
                self.torch.tile_state(persisted)
            }
            ToggleKind::QuickRecord => self.recorder.tile_state(),
            ToggleKind::Vibrate | ToggleKind::Silent | ToggleKind::SoundState => {
                render(kind, &ExternalValue::Ringer(Self::ringer(settings)))
            }
            ToggleKind::Pie | ToggleKind::ExpandedDesktop => {
                let on = settings.get_bool(Self::setting_for(kind)).unwrap_or(false);
                render(kind, &ExternalValue::Switch(on))
            }
            ToggleKind::FastCharge => {
                let on = self
                    .fast_charge_path()
                    .and_then(|p| dev.read_node(p))
                    .is_some_and(|v| v.trim() == "1");
                render(kind, &ExternalValue::Switch(on))
            }
            ToggleKind::User | ToggleKind::FavContact => {
                let info = if kind == ToggleKind::User {
                    self.user.as_ref()
                } else {
                    self.fav_contact.as_ref()
                };
                match info {
                    Some(p) => render(
                        kind,
                        &ExternalValue::Profile {
                            name: p.name.clone(),
                            image: p.image.clone(),
                        },
                    ),
                    None => TileState::placeholder(kind),
                }
            }
            _ => match dev.poll(kind) {
                Some(value) => render(kind, &value),
                None => return,
            },
        };
        self.store.update(kind, state);
    }

    /// Push machine changes to their tiles and the sink, then flush queued
    /// tile updates.
    fn finish(&mut self, settings: &impl SettingsStore, sink: &mut impl EventSink) {
        let recorder = self.recorder.state();
        if recorder != self.last_recorder {
            self.last_recorder = recorder;
            self.store.update(ToggleKind::QuickRecord, self.recorder.tile_state());
            sink.emit(&PanelEvent::RecorderChanged(recorder));
        }

        let torch = self.torch.state();
        let persisted = settings.get_bool(SettingKey::TorchState).unwrap_or(false);
        if torch != self.last_torch || persisted != self.last_torch_indicator {
            self.last_torch_indicator = persisted;
            self.store.update(ToggleKind::Torch, self.torch.tile_state(persisted));
            if torch != self.last_torch {
                self.last_torch = torch;
                sink.emit(&PanelEvent::TorchChanged(torch));
            }
        }

        let updates = std::mem::take(&mut *self.pending.borrow_mut());
        for (kind, state) in updates {
            sink.emit(&PanelEvent::TileUpdated { kind, state });
        }
    }

    fn shutdown(
        &mut self,
        now_ms: u64,
        settings: &mut impl SettingsStore,
        dev: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        self.torch.stop(&mut self.timers, dev, settings);
        if matches!(self.recorder.state(), RecorderState::Recording | RecorderState::Playing) {
            if let Err(e) = self.recorder.stop(now_ms, &mut self.timers, dev) {
                warn!("panel: stopping recorder on shutdown failed: {}", e);
            }
        }
        self.scheduler.cancel_all(&mut self.timers);
        self.finish(settings, sink);

        for slot in self.handles.iter_mut() {
            if let Some(handle) = slot.take() {
                self.store.deregister(handle);
            }
        }
        self.timers.cancel_where(|_| true);
        self.stopped = true;
        sink.emit(&PanelEvent::Stopped);
        info!("panel: stopped");
    }

    fn ringer(settings: &impl SettingsStore) -> RingerMode {
        settings
            .get_int(SettingKey::ModeRinger)
            .and_then(RingerMode::from_setting)
            .unwrap_or(RingerMode::Normal)
    }

    fn setting_for(kind: ToggleKind) -> SettingKey {
        if kind == ToggleKind::Pie {
            SettingKey::PieControls
        } else {
            SettingKey::ExpandedDesktopState
        }
    }

    fn report(kind: ToggleKind, err: Error, sink: &mut impl EventSink) {
        warn!("panel: {} failed: {}", kind, err);
        let event = match err {
            Error::Transition(e) => PanelEvent::TransitionRejected(e),
            Error::Hardware(error) => PanelEvent::HardwareFailed { kind, error },
            Error::Action(error) => PanelEvent::ActionFailed { kind, error },
            Error::Config(_) => return,
        };
        sink.emit(&event);
    }
}

// ───────────────────────────────────────────────────────────────
// Gesture tables
// ───────────────────────────────────────────────────────────────

/// The action that turns a switch-style toggle `on` or off.
fn switch_action(kind: ToggleKind, on: bool) -> Option<PanelAction> {
    Some(match kind {
        ToggleKind::Wifi => PanelAction::SetWifi(on),
        ToggleKind::WifiTether => PanelAction::SetWifiAp(on),
        ToggleKind::Bluetooth => PanelAction::SetBluetooth(on),
        ToggleKind::Nfc => PanelAction::SetNfc(on),
        ToggleKind::UsbTether => PanelAction::SetUsbTether(on),
        ToggleKind::Sync => PanelAction::SetMasterSync(on),
        ToggleKind::Gps => PanelAction::SetGps(on),
        ToggleKind::TwoG => PanelAction::SetTwoGOnly(on),
        ToggleKind::Lte => PanelAction::SetLte(on),
        ToggleKind::Airplane => PanelAction::SetAirplaneMode(on),
        ToggleKind::Signal => PanelAction::SetMobileData(on),
        // The tile reads "on" when auto-rotate is enabled.
        ToggleKind::Rotate => PanelAction::SetRotationLock(!on),
        _ => return None,
    })
}

fn exclusive_with(kind: ToggleKind) -> Option<ToggleKind> {
    match kind {
        ToggleKind::Wifi => Some(ToggleKind::WifiTether),
        ToggleKind::WifiTether => Some(ToggleKind::Wifi),
        _ => None,
    }
}

fn tap_surface(kind: ToggleKind, has_fav_contact: bool) -> Option<Surface> {
    Some(match kind {
        ToggleKind::User => Surface::UserSettings,
        ToggleKind::Brightness => Surface::DisplaySettings,
        ToggleKind::Settings => Surface::Settings,
        ToggleKind::Clock => Surface::DateTime,
        ToggleKind::Ime => Surface::InputMethodPicker,
        ToggleKind::Battery => Surface::BatteryUsage,
        ToggleKind::Memory => Surface::RunningApps,
        ToggleKind::FavContact if has_fav_contact => Surface::ContactCard,
        ToggleKind::FavContact => Surface::ContactPicker,
        _ => return None,
    })
}

fn long_press_surface(kind: ToggleKind) -> Option<Surface> {
    Some(match kind {
        ToggleKind::Wifi => Surface::WifiSettings,
        ToggleKind::Bluetooth => Surface::BluetoothSettings,
        ToggleKind::Gps => Surface::LocationSettings,
        ToggleKind::Signal | ToggleKind::TwoG | ToggleKind::Lte => Surface::MobileNetworkSettings,
        ToggleKind::WifiTether | ToggleKind::UsbTether => Surface::TetherSettings,
        ToggleKind::Vibrate | ToggleKind::Silent | ToggleKind::SoundState => Surface::SoundSettings,
        ToggleKind::Battery => Surface::BatteryUsage,
        ToggleKind::Rotate | ToggleKind::Brightness => Surface::DisplaySettings,
        ToggleKind::Airplane => Surface::Settings,
        _ => return None,
    })
}
