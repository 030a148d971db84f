//! Integration tests for the torch tile and external torch intents.

use crate::mock_hw::{HwCall, Rig};

use quickpanel::app::commands::PanelCommand;
use quickpanel::app::events::PanelEvent;
use quickpanel::config::PanelConfig;
use quickpanel::error::HardwareError;
use quickpanel::events::{ControlMsg, SettingKey};
use quickpanel::fsm::torch::{TorchIntent, TorchState};
use quickpanel::registry::{DeviceCapabilities, ToggleKind};
use quickpanel::tiles::{ExternalValue, RadioState};

const ACQUIRE: [HwCall; 4] = [
    HwCall::AcquireWakeLock,
    HwCall::OpenCamera,
    HwCall::StartPreview,
    HwCall::SetFlash(true),
];

const RELEASE: [HwCall; 4] = [
    HwCall::SetFlash(false),
    HwCall::StopPreview,
    HwCall::ReleaseCamera,
    HwCall::ReleaseWakeLock,
];

fn torch_rig() -> Rig {
    Rig::new("TORCH|WIFI")
}

#[test]
fn tap_starts_then_confirms_on() {
    let mut rig = torch_rig();
    rig.tap(ToggleKind::Torch);

    assert_eq!(rig.panel.torch_state(), TorchState::Starting);
    assert_eq!(rig.dev.calls, ACQUIRE.to_vec());
    assert_eq!(rig.panel.store().get(ToggleKind::Torch).label, "Turning on");

    rig.run_for(100);
    assert_eq!(rig.panel.torch_state(), TorchState::On);
    assert_eq!(rig.settings.get(SettingKey::TorchState), Some("1"));
    assert!(rig.panel.store().get(ToggleKind::Torch).enabled);
    assert!(rig.sink.any(|e| matches!(e, PanelEvent::TorchChanged(TorchState::On))));
}

#[test]
fn tap_while_on_releases_in_reverse_order() {
    let mut rig = torch_rig();
    rig.tap(ToggleKind::Torch);
    rig.run_for(100);
    rig.dev.clear_history();

    rig.tap(ToggleKind::Torch);
    assert_eq!(rig.panel.torch_state(), TorchState::Off);
    assert_eq!(rig.dev.calls, RELEASE.to_vec());
    assert_eq!(rig.settings.get(SettingKey::TorchState), Some("0"));
    assert!(!rig.panel.torch_hardware().any());
}

#[test]
fn stop_while_off_makes_no_hardware_calls() {
    let mut rig = torch_rig();
    rig.command(PanelCommand::Torch(TorchIntent::Off));
    rig.command(PanelCommand::Torch(TorchIntent::Toggle));
    rig.command(PanelCommand::Torch(TorchIntent::Toggle));

    // Only the Toggle pair touched hardware: one start, one stop.
    assert_eq!(rig.dev.count(&HwCall::OpenCamera), 1);
    assert_eq!(rig.dev.count(&HwCall::ReleaseCamera), 1);
    assert_eq!(rig.panel.torch_state(), TorchState::Off);

    rig.dev.clear_history();
    rig.command(PanelCommand::Torch(TorchIntent::Off));
    assert!(rig.dev.calls.is_empty());
}

#[test]
fn repeated_on_intent_is_ignored() {
    let mut rig = torch_rig();
    rig.command(PanelCommand::Torch(TorchIntent::On));
    rig.run_for(100);
    rig.tap(ToggleKind::Torch);
    assert_eq!(rig.panel.torch_state(), TorchState::Off);

    rig.command(PanelCommand::Torch(TorchIntent::On));
    assert_eq!(rig.panel.torch_state(), TorchState::Off);
    assert_eq!(rig.dev.count(&HwCall::OpenCamera), 1);
}

#[test]
fn unconfirmed_start_gives_up_and_releases() {
    let mut rig = torch_rig();
    rig.dev.preview_ready = false;
    rig.tap(ToggleKind::Torch);

    let cfg = PanelConfig::default();
    rig.run_for(u64::from(cfg.torch_confirm_interval_ms) * u64::from(cfg.torch_confirm_attempts));

    assert_eq!(rig.panel.torch_state(), TorchState::Off);
    assert!(!rig.panel.torch_hardware().any());
    assert_eq!(rig.dev.count(&HwCall::ReleaseWakeLock), 1);
    assert!(rig.sink.any(|e| matches!(
        e,
        PanelEvent::HardwareFailed {
            kind: ToggleKind::Torch,
            error: HardwareError::TorchNotConfirmed
        }
    )));
    assert_eq!(rig.panel.next_due(), None);
}

#[test]
fn locked_keyguard_accepts_commanded_flash() {
    let mut rig = torch_rig();
    rig.dev.preview_ready = false;
    rig.dev.locked = true;
    rig.tap(ToggleKind::Torch);
    rig.run_for(100);
    assert_eq!(rig.panel.torch_state(), TorchState::On);
    assert_eq!(rig.settings.get(SettingKey::TorchState), Some("1"));
}

#[test]
fn keyguard_message_while_starting_confirms() {
    let mut rig = torch_rig();
    rig.dev.preview_ready = false;
    rig.tap(ToggleKind::Torch);
    rig.message(ControlMsg::KeyguardChanged { locked: true });

    assert_eq!(rig.panel.torch_state(), TorchState::On);
    // Pending readiness checks are gone.
    assert_eq!(rig.panel.next_due(), None);
}

#[test]
fn camera_failure_releases_wake_lock() {
    let mut rig = torch_rig();
    rig.dev.camera_fails = true;
    rig.tap(ToggleKind::Torch);

    assert_eq!(rig.panel.torch_state(), TorchState::Off);
    assert_eq!(
        rig.dev.calls,
        vec![HwCall::AcquireWakeLock, HwCall::ReleaseWakeLock]
    );
    assert!(rig.sink.any(|e| matches!(
        e,
        PanelEvent::HardwareFailed {
            kind: ToggleKind::Torch,
            error: HardwareError::CameraUnavailable
        }
    )));
}

#[test]
fn external_reports_do_not_override_the_machine() {
    let mut rig = torch_rig();
    rig.tap(ToggleKind::Torch);
    rig.message(ControlMsg::ExternalStateChanged {
        kind: ToggleKind::Torch,
        value: ExternalValue::Radio(RadioState::Off),
    });
    assert_eq!(rig.panel.torch_state(), TorchState::Starting);
    assert_eq!(rig.panel.store().get(ToggleKind::Torch).label, "Turning on");
}

#[test]
fn persisted_indicator_shows_while_machine_is_off() {
    let rig = Rig::build(
        "TORCH",
        PanelConfig::default(),
        DeviceCapabilities::default(),
        |settings, _| settings.set(SettingKey::TorchState, "1"),
    );
    assert_eq!(rig.panel.torch_state(), TorchState::Off);
    assert!(rig.panel.store().get(ToggleKind::Torch).enabled);
}

#[test]
fn shutdown_turns_the_torch_off() {
    let mut rig = torch_rig();
    rig.tap(ToggleKind::Torch);
    rig.run_for(100);
    rig.dev.clear_history();

    rig.command(PanelCommand::Shutdown);
    assert_eq!(rig.dev.calls, RELEASE.to_vec());
    assert_eq!(rig.settings.get(SettingKey::TorchState), Some("0"));
}

#[test]
fn tap_on_torch_lit_elsewhere_turns_it_off() {
    let mut rig = Rig::build(
        "TORCH",
        PanelConfig::default(),
        DeviceCapabilities::default(),
        |settings, _| settings.set(SettingKey::TorchState, "1"),
    );
    assert!(rig.panel.store().get(ToggleKind::Torch).enabled);

    rig.tap(ToggleKind::Torch);
    assert_eq!(rig.panel.torch_state(), TorchState::Off);
    assert!(rig.dev.calls.is_empty());
    assert_eq!(rig.settings.get(SettingKey::TorchState), Some("0"));
    assert!(!rig.panel.store().get(ToggleKind::Torch).enabled);

    // The next tap lights it here.
    rig.tap(ToggleKind::Torch);
    assert_eq!(rig.panel.torch_state(), TorchState::Starting);
}

#[test]
fn off_intent_clears_a_foreign_indicator() {
    let mut rig = Rig::build(
        "TORCH",
        PanelConfig::default(),
        DeviceCapabilities::default(),
        |settings, _| settings.set(SettingKey::TorchState, "1"),
    );
    rig.command(PanelCommand::Torch(TorchIntent::Off));
    assert!(rig.dev.calls.is_empty());
    assert_eq!(rig.settings.get(SettingKey::TorchState), Some("0"));
    assert!(!rig.panel.store().get(ToggleKind::Torch).enabled);
}
