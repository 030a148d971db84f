//! QuickPanel host demo: main entry point.
//!
//! Wires the host adapters around the panel and drives a scripted session
//! on a virtual clock, then prints a JSON snapshot of the visible tiles.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimulatedDevice    LogEventSink   MemoryStore   HostClock     │
//! │  (Action+Poll+Cam)  (EventSink)    (Settings+Cfg)              │
//! │  SysfsShell         ThreadBackground                           │
//! │  (Shell+Probe)      (Background → Inbox)                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              QuickPanel (pure logic)                   │    │
//! │  │  Store · Scheduler · Watcher · Recorder · Torch        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use quickpanel::adapters::background::{ProfileDirectory, ThreadBackground};
use quickpanel::adapters::log_sink::LogEventSink;
use quickpanel::adapters::shell::SysfsShell;
use quickpanel::adapters::sim::SimulatedDevice;
use quickpanel::adapters::store::MemoryStore;
use quickpanel::adapters::time::HostClock;
use quickpanel::app::commands::PanelCommand;
use quickpanel::app::ports::{ConfigPort, SettingsStore};
use quickpanel::app::service::QuickPanel;
use quickpanel::config::PanelConfig;
use quickpanel::events::{ControlMsg, Inbox, ProfileInfo, SettingKey};
use quickpanel::fsm::torch::TorchIntent;
use quickpanel::registry::{DeviceCapabilities, ToggleKind};

const DEMO_ORDER: &str = "USER|WIFI|BLUETOOTH|GPS|TORCH|QUICKRECORD|FCHARGE|BATTERY|SOUNDSTATE|FAVCONTACT";

// ── Session ───────────────────────────────────────────────────

struct Session {
    panel: QuickPanel,
    store: MemoryStore,
    dev: SimulatedDevice,
    sink: LogEventSink,
    inbox: Arc<Inbox>,
    now_ms: u64,
}

impl Session {
    fn command(&mut self, cmd: PanelCommand) {
        info!("── t={} ms: {:?}", self.now_ms, cmd);
        self.panel
            .handle_command(cmd, self.now_ms, &mut self.store, &mut self.dev, &mut self.sink);
    }

    /// Run timers and inbox traffic until `delta_ms` of virtual time passed.
    fn run_for(&mut self, delta_ms: u64) {
        let until = self.now_ms + delta_ms;
        loop {
            self.dev.background().join_all();
            self.panel
                .drain_inbox(&self.inbox, self.now_ms, &mut self.store, &mut self.dev, &mut self.sink);
            match self.panel.next_due() {
                Some(due) if due <= until => {
                    self.now_ms = self.now_ms.max(due);
                    self.panel
                        .advance(self.now_ms, &mut self.store, &mut self.dev, &mut self.sink);
                }
                _ => break,
            }
        }
        self.now_ms = until;
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let clock = HostClock::new();
    info!("QuickPanel v{} host demo", env!("CARGO_PKG_VERSION"));

    // ── 2. Scratch directory for the recording and sysfs node ─
    let root = std::env::temp_dir().join(format!("quickpanel-demo-{}", std::process::id()));
    fs::create_dir_all(&root).with_context(|| format!("creating {}", root.display()))?;
    let node = root.join("force_fast_charge");
    fs::write(&node, "0").with_context(|| format!("creating {}", node.display()))?;
    let recording = root.join("quickrecord.3gp");

    // ── 3. Settings + config ──────────────────────────────────
    let inbox = Arc::new(Inbox::new());
    let mut store = MemoryStore::with_inbox(Arc::clone(&inbox));
    let loaded = match store.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config load failed ({}), using defaults", e);
            PanelConfig::default()
        }
    };
    let config = PanelConfig {
        quick_record_path: path_string(&recording),
        fast_charge_path: Some(path_string(&node)),
        ..loaded
    };
    if let Err(e) = store.save(&config) {
        warn!("config not persisted: {}", e);
    }

    store.seed(SettingKey::QuickToggles, DEMO_ORDER);
    store.seed(SettingKey::QuickTogglesPerRow, "4");
    store.seed(SettingKey::QuickToggleFavContact, "lookup/ann");
    store.seed(SettingKey::ModeRinger, "2");

    // ── 4. Device adapters ────────────────────────────────────
    let mut directory = ProfileDirectory {
        owner: Some(ProfileInfo {
            name: String::from("Demo User"),
            image: None,
        }),
        ..ProfileDirectory::default()
    };
    directory.contacts.insert(
        String::from("lookup/ann"),
        ProfileInfo {
            name: String::from("Ann"),
            image: Some(String::from("content://contacts/ann/photo")),
        },
    );
    let background =
        ThreadBackground::new(Arc::clone(&inbox), directory).with_latency(Duration::from_millis(20));
    let shell = SysfsShell::with_fallback("sh");
    let dev = SimulatedDevice::new(Arc::clone(&inbox), shell, background);

    // ── 5. Panel ──────────────────────────────────────────────
    let mut session = Session {
        panel: QuickPanel::new(config, DeviceCapabilities::default()),
        store,
        dev,
        sink: LogEventSink::new(),
        inbox,
        now_ms: 0,
    };
    session
        .panel
        .start(0, &mut session.store, &mut session.dev, &mut session.sink);
    session.run_for(100);

    // ── 6. Scripted session ───────────────────────────────────
    // Wi-Fi has no change broadcast: watch the confirmation window settle it.
    session.command(PanelCommand::Tap(ToggleKind::Wifi));
    session.run_for(1_000);

    // A second GPS tap inside the window replaces the first job.
    session.command(PanelCommand::Tap(ToggleKind::Gps));
    session.run_for(300);
    session.command(PanelCommand::Tap(ToggleKind::Gps));
    session.run_for(3_500);

    // Torch: tile tap, then an external Off intent.
    session.command(PanelCommand::Tap(ToggleKind::Torch));
    session.run_for(500);
    session.command(PanelCommand::Torch(TorchIntent::Off));
    session.run_for(100);

    // Quick record: long-press starts, tap stops, revert, tap plays.
    session.command(PanelCommand::LongPress(ToggleKind::QuickRecord));
    session.run_for(5_000);
    session.command(PanelCommand::Tap(ToggleKind::QuickRecord));
    session.run_for(2_500);
    session.command(PanelCommand::Tap(ToggleKind::QuickRecord));
    session.inbox.post(ControlMsg::PlaybackCompleted);
    session.run_for(100);

    // Fire-and-forget fast charge, re-read 250 ms later.
    session.command(PanelCommand::Tap(ToggleKind::FastCharge));
    session.run_for(300);

    // Sound state cycles the ringer; the simulated device reports back.
    session.command(PanelCommand::Tap(ToggleKind::SoundState));
    session.run_for(100);

    // Reorder: only the removed tiles lose their callbacks.
    if let Err(e) = session
        .store
        .put_string(SettingKey::QuickToggles, "WIFI|BATTERY|TORCH|QUICKRECORD")
    {
        warn!("reorder failed: {}", e);
    }
    session.dev.set_battery(81, true);
    session.run_for(100);

    // ── 7. Snapshot + shutdown ────────────────────────────────
    let snapshot = session.panel.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    session.command(PanelCommand::Shutdown);
    session.dev.background().join_all();
    session.panel.save_config(&session.store);
    info!(
        "session done: {} events in {} ms wall time",
        session.sink.emitted(),
        clock.now_ms()
    );

    if let Err(e) = fs::remove_dir_all(&root) {
        warn!("cleanup of {} failed: {}", root.display(), e);
    }
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
