//! Integration tests for the QuickPanel → scheduler → tile store pipeline.
//!
//! Drives a started panel through gestures, settings changes and timer
//! ticks on a virtual clock and checks what reached the mock device, the
//! settings and the event sink.

use crate::mock_hw::{BgCall, HwCall, Rig};

use quickpanel::app::commands::PanelCommand;
use quickpanel::app::events::{PanelEvent, Surface};
use quickpanel::app::ports::{BroadcastCommand, PanelAction};
use quickpanel::config::PanelConfig;
use quickpanel::error::ActionError;
use quickpanel::events::{ControlMsg, ProfileInfo, SettingKey};
use quickpanel::order;
use quickpanel::registry::{DeviceCapabilities, ToggleKind};
use quickpanel::tiles::{ExternalValue, RadioState, RingerMode, TileState};

const FC_NODE: &str = "/sys/kernel/fast_charge/force_fast_charge";

fn wifi(state: RadioState, ssid: Option<&str>) -> ExternalValue {
    ExternalValue::Wifi {
        state,
        ssid: ssid.map(String::from),
    }
}

fn fast_charge_config() -> PanelConfig {
    PanelConfig {
        fast_charge_path: Some(String::from(FC_NODE)),
        ..PanelConfig::default()
    }
}

// ── Order and visibility ──────────────────────────────────────

#[test]
fn stored_order_is_shown_exactly() {
    let rig = Rig::new("WIFI|TORCH|BATTERY");

    assert_eq!(
        rig.panel.order().as_slice(),
        &[ToggleKind::Wifi, ToggleKind::Torch, ToggleKind::Battery]
    );
    for kind in [ToggleKind::Wifi, ToggleKind::Torch, ToggleKind::Battery] {
        assert!(rig.panel.callback_handle(kind).is_some(), "{} has no callback", kind);
    }
    assert!(rig.panel.callback_handle(ToggleKind::Gps).is_none());
    assert!(rig.sink.any(|e| matches!(e, PanelEvent::Started { visible: 3 })));
    assert!(rig.sink.any(|e| matches!(e, PanelEvent::LayoutChanged { .. })));
}

#[test]
fn unknown_and_duplicate_tokens_are_dropped() {
    let rig = Rig::new("WIFI|BOGUS|WIFI|GPS|");
    assert_eq!(rig.panel.order().as_slice(), &[ToggleKind::Wifi, ToggleKind::Gps]);
}

#[test]
fn unsupported_tiles_are_filtered_out() {
    let caps = DeviceCapabilities {
        camera_flash: false,
        ..DeviceCapabilities::default()
    };
    let rig = Rig::build("TORCH|WIFI", PanelConfig::default(), caps, |_, _| {});
    assert_eq!(rig.panel.order().as_slice(), &[ToggleKind::Wifi]);
}

#[test]
fn empty_order_falls_back_to_default() {
    let rig = Rig::new("");
    let expected = order::default_order(rig.panel.capabilities());
    assert!(!expected.is_empty());
    assert_eq!(rig.panel.order(), &expected);
}

#[test]
fn columns_come_from_settings() {
    let rig = Rig::build(
        "WIFI",
        PanelConfig::default(),
        DeviceCapabilities::default(),
        |settings, _| settings.set(SettingKey::QuickTogglesPerRow, "5"),
    );
    assert_eq!(rig.panel.layout().columns, 5);
    assert_eq!(rig.panel.layout().text_size_sp, 8);
}

#[test]
fn removing_a_tile_keeps_the_others_callbacks() {
    let mut rig = Rig::new("WIFI|TORCH|BATTERY");
    let wifi_handle = rig.panel.callback_handle(ToggleKind::Wifi);
    let battery_handle = rig.panel.callback_handle(ToggleKind::Battery);

    rig.settings.set(SettingKey::QuickToggles, "WIFI|BATTERY");
    rig.message(ControlMsg::SettingsChanged {
        key: SettingKey::QuickToggles,
    });

    assert_eq!(rig.panel.order().as_slice(), &[ToggleKind::Wifi, ToggleKind::Battery]);
    assert_eq!(rig.panel.callback_handle(ToggleKind::Wifi), wifi_handle);
    assert_eq!(rig.panel.callback_handle(ToggleKind::Battery), battery_handle);
    assert_eq!(rig.panel.callback_handle(ToggleKind::Torch), None);
    assert_eq!(rig.panel.store().callback_count(ToggleKind::Torch), 0);
    assert_eq!(rig.panel.store().callback_count(ToggleKind::Wifi), 1);
}

#[test]
fn removing_a_tile_cancels_its_confirmation() {
    let mut rig = Rig::new("WIFI|GPS");
    rig.dev.set(ToggleKind::Gps, ExternalValue::Radio(RadioState::Off));
    rig.tap(ToggleKind::Gps);
    assert!(rig.panel.is_confirming(ToggleKind::Gps));

    rig.settings.set(SettingKey::QuickToggles, "WIFI");
    rig.message(ControlMsg::SettingsChanged {
        key: SettingKey::QuickToggles,
    });
    assert!(!rig.panel.is_confirming(ToggleKind::Gps));
    assert_eq!(rig.panel.next_due(), None);
}

// ── Confirmation polling ──────────────────────────────────────

#[test]
fn wifi_tap_polls_for_the_whole_window() {
    let mut rig = Rig::build(
        "WIFI",
        PanelConfig::default(),
        DeviceCapabilities::default(),
        |_, dev| dev.set(ToggleKind::Wifi, wifi(RadioState::Off, None)),
    );
    assert!(!rig.panel.store().get(ToggleKind::Wifi).enabled);

    rig.tap(ToggleKind::Wifi);
    assert_eq!(rig.dev.actions, vec![PanelAction::SetWifi(true)]);
    assert!(rig.panel.is_confirming(ToggleKind::Wifi));
    assert_eq!(rig.panel.store().get(ToggleKind::Wifi).label, "Turning on");

    rig.dev.clear_history();
    rig.dev.set(ToggleKind::Wifi, wifi(RadioState::On, Some("home")));
    rig.run_for(250);
    assert_eq!(rig.dev.poll_count(ToggleKind::Wifi), 1);
    assert_eq!(rig.panel.store().get(ToggleKind::Wifi).label, "home");
    assert!(rig.panel.is_confirming(ToggleKind::Wifi));

    rig.run_for(11 * 250);
    assert_eq!(rig.dev.poll_count(ToggleKind::Wifi), 12);
    assert!(!rig.panel.is_confirming(ToggleKind::Wifi));
    assert_eq!(rig.panel.next_due(), None);
}

#[test]
fn second_request_replaces_the_first() {
    let mut rig = Rig::new("GPS");
    rig.dev.set(ToggleKind::Gps, ExternalValue::Radio(RadioState::Off));

    rig.tap(ToggleKind::Gps);
    rig.dev.clear_history();
    rig.run_for(500);
    assert_eq!(rig.dev.poll_count(ToggleKind::Gps), 2);

    // The tile polled back to Off, so this tap asks for Off again.
    rig.tap(ToggleKind::Gps);
    assert_eq!(rig.dev.actions, vec![PanelAction::SetGps(false)]);

    rig.run_for(10_000);
    assert_eq!(rig.dev.poll_count(ToggleKind::Gps), 2 + 12);
    assert!(!rig.panel.is_confirming(ToggleKind::Gps));
}

#[test]
fn authoritative_report_ends_confirmation() {
    let mut rig = Rig::new("WIFI");
    rig.dev.set(ToggleKind::Wifi, wifi(RadioState::Off, None));
    rig.tap(ToggleKind::Wifi);
    rig.dev.clear_history();

    rig.message(ControlMsg::ExternalStateChanged {
        kind: ToggleKind::Wifi,
        value: wifi(RadioState::On, Some("office")),
    });
    assert!(!rig.panel.is_confirming(ToggleKind::Wifi));
    assert_eq!(rig.panel.store().get(ToggleKind::Wifi).label, "office");

    rig.run_for(5_000);
    assert_eq!(rig.dev.poll_count(ToggleKind::Wifi), 0);
}

#[test]
fn reports_for_unwatched_sources_are_dropped() {
    let mut rig = Rig::new("WIFI");
    rig.sink.events.clear();

    rig.message(ControlMsg::ExternalStateChanged {
        kind: ToggleKind::Battery,
        value: ExternalValue::Battery {
            level: 50,
            charging: true,
        },
    });
    assert_eq!(rig.sink.tile_updates(ToggleKind::Battery), 0);
    assert_eq!(
        rig.panel.store().get(ToggleKind::Battery),
        TileState::placeholder(ToggleKind::Battery)
    );
}

#[test]
fn battery_report_updates_visible_tile() {
    let mut rig = Rig::new("BATTERY");
    rig.sink.events.clear();
    rig.message(ControlMsg::ExternalStateChanged {
        kind: ToggleKind::Battery,
        value: ExternalValue::Battery {
            level: 64,
            charging: true,
        },
    });
    assert_eq!(rig.sink.tile_updates(ToggleKind::Battery), 1);
    assert_eq!(rig.panel.store().get(ToggleKind::Battery).label, "64%, charging");
}

#[test]
fn wifi_and_hotspot_are_mutually_exclusive() {
    let mut rig = Rig::new("WIFI|WIFITETHER");
    rig.dev.set(ToggleKind::WifiTether, ExternalValue::Radio(RadioState::On));
    rig.dev.set(ToggleKind::Wifi, wifi(RadioState::Off, None));

    rig.tap(ToggleKind::Wifi);
    assert_eq!(
        rig.dev.actions,
        vec![PanelAction::SetWifiAp(false), PanelAction::SetWifi(true)]
    );
    assert!(rig.panel.is_confirming(ToggleKind::Wifi));
    assert!(rig.panel.is_confirming(ToggleKind::WifiTether));
    assert_eq!(rig.panel.store().get(ToggleKind::WifiTether).label, "Turning off");
}

#[test]
fn rejected_action_is_reported_and_not_confirmed() {
    let mut rig = Rig::new("WIFI");
    rig.dev.rejected.push(ToggleKind::Wifi);
    rig.tap(ToggleKind::Wifi);

    assert!(rig.sink.any(|e| matches!(
        e,
        PanelEvent::ActionFailed {
            kind: ToggleKind::Wifi,
            error: ActionError::Rejected
        }
    )));
    assert!(!rig.panel.is_confirming(ToggleKind::Wifi));
}

// ── Gestures ──────────────────────────────────────────────────

#[test]
fn taps_on_hidden_tiles_do_nothing() {
    let mut rig = Rig::new("WIFI");
    rig.tap(ToggleKind::Gps);
    rig.long_press(ToggleKind::Bluetooth);
    assert!(rig.dev.actions.is_empty());
    assert!(!rig.sink.any(|e| matches!(e, PanelEvent::LaunchRequested(_))));
}

#[test]
fn navigation_tiles_launch_and_collapse() {
    let mut rig = Rig::new("BATTERY|WIFI|FAVCONTACT");
    rig.tap(ToggleKind::Battery);
    rig.long_press(ToggleKind::Wifi);
    rig.tap(ToggleKind::FavContact);

    let launched: Vec<Surface> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            PanelEvent::LaunchRequested(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        launched,
        vec![Surface::BatteryUsage, Surface::WifiSettings, Surface::ContactPicker]
    );
    let collapses = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, PanelEvent::CollapseRequested))
        .count();
    assert_eq!(collapses, 3);
}

#[test]
fn reboot_menu_broadcasts_and_collapses() {
    let mut rig = Rig::new("REBOOTMENU");
    rig.tap(ToggleKind::RebootMenu);
    assert_eq!(
        rig.dev.actions,
        vec![PanelAction::Broadcast(BroadcastCommand::RebootMenu)]
    );
    assert!(rig.sink.any(|e| matches!(e, PanelEvent::CollapseRequested)));
    assert!(!rig.panel.is_confirming(ToggleKind::RebootMenu));
}

#[test]
fn sound_state_cycles_the_ringer() {
    let mut rig = Rig::build(
        "SOUNDSTATE",
        PanelConfig::default(),
        DeviceCapabilities::default(),
        |settings, _| settings.set(SettingKey::ModeRinger, "2"),
    );
    rig.tap(ToggleKind::SoundState);
    assert_eq!(
        rig.dev.actions,
        vec![PanelAction::SetRingerMode(RingerMode::Normal.next())]
    );
}

#[test]
fn pie_tap_flips_setting_and_refreshes_on_change() {
    let mut rig = Rig::new("PIE");
    assert!(!rig.panel.store().get(ToggleKind::Pie).enabled);

    rig.tap(ToggleKind::Pie);
    assert!(rig
        .settings
        .writes
        .contains(&(SettingKey::PieControls, String::from("1"))));

    rig.message(ControlMsg::SettingsChanged {
        key: SettingKey::PieControls,
    });
    assert!(rig.panel.store().get(ToggleKind::Pie).enabled);
}

// ── Fast charge ───────────────────────────────────────────────

#[test]
fn fast_charge_hidden_without_node() {
    let rig = Rig::build("FCHARGE|WIFI", fast_charge_config(), DeviceCapabilities::default(), |_, _| {});
    assert_eq!(rig.panel.order().as_slice(), &[ToggleKind::Wifi]);
    assert!(!rig.panel.capabilities().fast_charge_node);
}

#[test]
fn fast_charge_write_then_delayed_refresh() {
    let mut rig = Rig::build(
        "FCHARGE|WIFI",
        fast_charge_config(),
        DeviceCapabilities::default(),
        |_, dev| {
            dev.nodes.insert(String::from(FC_NODE), String::from("0"));
        },
    );
    assert!(rig.panel.is_visible(ToggleKind::FastCharge));
    assert!(!rig.panel.store().get(ToggleKind::FastCharge).enabled);

    rig.tap(ToggleKind::FastCharge);
    assert_eq!(
        rig.dev.calls.last(),
        Some(&HwCall::WriteNode(String::from(FC_NODE), String::from("1")))
    );
    assert!(rig
        .settings
        .writes
        .contains(&(SettingKey::FastChargeLast, String::from("1"))));
    assert!(!rig.panel.is_confirming(ToggleKind::FastCharge));
    assert!(!rig.panel.store().get(ToggleKind::FastCharge).enabled);

    rig.run_for(250);
    assert!(rig.panel.store().get(ToggleKind::FastCharge).enabled);
}

#[test]
fn fast_charge_restored_on_start() {
    let rig = Rig::build(
        "FCHARGE",
        fast_charge_config(),
        DeviceCapabilities::default(),
        |settings, dev| {
            settings.set(SettingKey::FastChargeLast, "1");
            dev.nodes.insert(String::from(FC_NODE), String::from("0"));
        },
    );
    assert_eq!(rig.dev.nodes.get(FC_NODE).map(String::as_str), Some("1"));
    assert!(rig.panel.store().get(ToggleKind::FastCharge).enabled);
}

// ── Profiles ──────────────────────────────────────────────────

#[test]
fn stale_profile_lookup_is_dropped() {
    let mut rig = Rig::new("USER|WIFI");
    let first = rig.dev.last_generation().unwrap();

    rig.message(ControlMsg::ProfileChanged);
    let second = rig.dev.last_generation().unwrap();
    assert_ne!(first, second);

    let sam = ProfileInfo {
        name: String::from("Sam"),
        image: None,
    };
    rig.message(ControlMsg::UserInfoLoaded {
        generation: first,
        info: sam.clone(),
    });
    assert_eq!(
        rig.panel.store().get(ToggleKind::User),
        TileState::placeholder(ToggleKind::User)
    );

    rig.message(ControlMsg::UserInfoLoaded {
        generation: second,
        info: sam,
    });
    assert_eq!(rig.panel.store().get(ToggleKind::User).label, "Sam");
}

#[test]
fn fav_contact_lookup_uses_stored_key() {
    let mut rig = Rig::build(
        "FAVCONTACT",
        PanelConfig::default(),
        DeviceCapabilities::default(),
        |settings, _| settings.set(SettingKey::QuickToggleFavContact, "lookup/ann"),
    );
    let generation = rig.dev.last_generation().unwrap();
    assert!(rig
        .dev
        .background
        .contains(&BgCall::FavContact(generation, Some(String::from("lookup/ann")))));
    assert!(!rig.dev.background.iter().any(|b| matches!(b, BgCall::User(_))));

    rig.message(ControlMsg::FavContactLoaded {
        generation,
        info: Some(ProfileInfo {
            name: String::from("Ann"),
            image: Some(String::from("ann.png")),
        }),
    });
    assert_eq!(rig.panel.store().get(ToggleKind::FavContact).label, "Ann");

    rig.tap(ToggleKind::FavContact);
    assert!(rig.sink.any(|e| matches!(e, PanelEvent::LaunchRequested(Surface::ContactCard))));
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn shutdown_detaches_everything() {
    let mut rig = Rig::new("WIFI|TORCH");
    rig.dev.set(ToggleKind::Wifi, wifi(RadioState::Off, None));
    rig.tap(ToggleKind::Wifi);
    rig.tap(ToggleKind::Torch);

    rig.command(PanelCommand::Shutdown);
    assert!(rig.panel.is_stopped());
    assert!(rig.sink.any(|e| matches!(e, PanelEvent::Stopped)));
    assert_eq!(rig.panel.callback_handle(ToggleKind::Wifi), None);
    assert!(!rig.panel.is_confirming(ToggleKind::Wifi));
    assert_eq!(rig.panel.next_due(), None);
    assert!(!rig.panel.torch_hardware().any());

    rig.dev.clear_history();
    rig.tap(ToggleKind::Wifi);
    assert!(rig.dev.actions.is_empty());
}

#[test]
fn snapshot_serializes_visible_tiles() {
    let rig = Rig::new("WIFI|BATTERY|QUICKRECORD");
    let json = serde_json::to_value(rig.panel.snapshot()).unwrap();
    assert_eq!(json["tiles"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["layout"]["columns"], 3);
    assert_eq!(json["recorder"], "Idle");
}
