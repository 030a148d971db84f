//! Integration tests for the quick-record tile.

use crate::mock_hw::{BgCall, HwCall, Rig};

use quickpanel::app::commands::PanelCommand;
use quickpanel::app::events::PanelEvent;
use quickpanel::config::PanelConfig;
use quickpanel::error::HardwareError;
use quickpanel::events::{ControlMsg, SettingKey};
use quickpanel::fsm::recorder::RecorderState;
use quickpanel::registry::{DeviceCapabilities, ToggleKind};
use quickpanel::tiles::TilePayload;

const PATH: &str = "/data/quickrecord.3gp";

fn config() -> PanelConfig {
    PanelConfig {
        quick_record_path: String::from(PATH),
        ..PanelConfig::default()
    }
}

fn recorder_rig() -> Rig {
    Rig::build("QUICKRECORD|WIFI", config(), DeviceCapabilities::default(), |_, _| {})
}

#[test]
fn start_checks_for_the_recording_file() {
    let rig = recorder_rig();
    assert!(
        rig.dev
            .background
            .iter()
            .any(|b| matches!(b, BgCall::FileCheck(path, _) if path == PATH))
    );
    assert_eq!(rig.panel.recorder_state(), RecorderState::Idle);
}

#[test]
fn missing_file_blocks_playback() {
    let mut rig = recorder_rig();
    rig.answer_file_check(false);
    assert_eq!(rig.panel.recorder_state(), RecorderState::NoRecording);
    assert!(!rig.panel.recording_present());

    rig.tap(ToggleKind::QuickRecord);
    assert_eq!(rig.panel.recorder_state(), RecorderState::NoRecording);
    assert!(!rig.dev.calls.iter().any(|c| matches!(c, HwCall::StartPlayback(_))));

    // A long-press still records.
    rig.long_press(ToggleKind::QuickRecord);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Recording);
}

#[test]
fn record_stop_then_revert_to_idle() {
    let mut rig = recorder_rig();
    rig.long_press(ToggleKind::QuickRecord);
    assert_eq!(rig.dev.calls, vec![HwCall::StartRecording(String::from(PATH))]);
    assert!(rig.panel.store().get(ToggleKind::QuickRecord).enabled);

    rig.run_for(5_000);
    rig.tap(ToggleKind::QuickRecord);
    assert_eq!(rig.panel.recorder_state(), RecorderState::JustRecorded);
    assert_eq!(rig.dev.calls.last(), Some(&HwCall::StopRecording));
    assert!(rig.panel.recording_present());
    assert_eq!(
        rig.panel.store().get(ToggleKind::QuickRecord).payload,
        TilePayload::Recorder {
            state: RecorderState::JustRecorded
        }
    );

    rig.run_for(u64::from(config().record_revert_ms));
    assert_eq!(rig.panel.recorder_state(), RecorderState::Idle);
    assert_eq!(rig.panel.next_due(), None);
}

#[test]
fn recording_stops_automatically() {
    let mut rig = recorder_rig();
    rig.long_press(ToggleKind::QuickRecord);
    rig.run_for(u64::from(config().record_auto_stop_ms));

    assert_eq!(rig.panel.recorder_state(), RecorderState::JustRecorded);
    assert_eq!(rig.dev.count(&HwCall::StopRecording), 1);
}

#[test]
fn stale_auto_stop_does_not_touch_a_new_recording() {
    let mut rig = recorder_rig();
    let auto_stop = u64::from(config().record_auto_stop_ms);

    rig.long_press(ToggleKind::QuickRecord);
    rig.run_for(1_000);
    rig.tap(ToggleKind::QuickRecord);
    rig.long_press(ToggleKind::QuickRecord);

    // The first recording's deadline passes; the second keeps going.
    rig.run_for(auto_stop - 500);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Recording);
    rig.run_for(500);
    assert_eq!(rig.panel.recorder_state(), RecorderState::JustRecorded);
}

#[test]
fn playback_runs_until_completion() {
    let mut rig = recorder_rig();
    rig.dev.files.insert(String::from(PATH));
    rig.answer_file_check(true);

    rig.tap(ToggleKind::QuickRecord);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Playing);
    assert_eq!(rig.dev.calls, vec![HwCall::StartPlayback(String::from(PATH))]);

    // Long-press has no meaning while playing.
    rig.long_press(ToggleKind::QuickRecord);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Playing);

    rig.message(ControlMsg::PlaybackCompleted);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Idle);
    assert_eq!(rig.dev.calls.last(), Some(&HwCall::StopPlayback));
    assert!(rig.sink.any(|e| matches!(e, PanelEvent::RecorderChanged(RecorderState::Idle))));
}

#[test]
fn player_failure_is_reported() {
    let mut rig = recorder_rig();
    rig.dev.files.insert(String::from(PATH));
    rig.dev.player_fails = true;
    rig.tap(ToggleKind::QuickRecord);

    assert_eq!(rig.panel.recorder_state(), RecorderState::Idle);
    assert!(rig.sink.any(|e| matches!(
        e,
        PanelEvent::HardwareFailed {
            kind: ToggleKind::QuickRecord,
            error: HardwareError::PlayerUnavailable
        }
    )));
}

#[test]
fn file_found_clears_no_recording() {
    let mut rig = recorder_rig();
    rig.answer_file_check(false);
    assert_eq!(rig.panel.recorder_state(), RecorderState::NoRecording);

    // A reconfigure starts a fresh check, which finds the file.
    rig.message(ControlMsg::SettingsChanged {
        key: SettingKey::QuickToggles,
    });
    rig.answer_file_check(true);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Idle);
    assert!(rig.panel.recording_present());
}

#[test]
fn check_started_before_recording_cannot_abort_it() {
    let mut rig = recorder_rig();
    rig.long_press(ToggleKind::QuickRecord);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Recording);

    // The start-up check reports late, after the recording began.
    rig.answer_file_check(false);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Recording);
    assert_eq!(rig.dev.count(&HwCall::StopRecording), 0);
    assert_eq!(rig.dev.calls, vec![HwCall::StartRecording(String::from(PATH))]);
}

#[test]
fn reorder_while_recording_does_not_check_the_file() {
    let mut rig = recorder_rig();
    rig.long_press(ToggleKind::QuickRecord);
    rig.dev.clear_history();

    rig.settings.set(SettingKey::QuickToggles, "WIFI|QUICKRECORD");
    rig.message(ControlMsg::SettingsChanged {
        key: SettingKey::QuickToggles,
    });
    assert_eq!(rig.dev.last_file_check(), None);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Recording);
}

#[test]
fn tap_after_file_was_deleted_shows_no_recording() {
    let mut rig = recorder_rig();
    rig.dev.files.insert(String::from(PATH));
    rig.answer_file_check(true);
    assert_eq!(rig.panel.recorder_state(), RecorderState::Idle);

    rig.dev.files.remove(PATH);
    rig.tap(ToggleKind::QuickRecord);

    assert_eq!(rig.panel.recorder_state(), RecorderState::NoRecording);
    assert!(!rig.panel.recording_present());
    assert!(!rig.dev.calls.iter().any(|c| matches!(c, HwCall::StartPlayback(_))));
    assert!(!rig.sink.any(|e| matches!(e, PanelEvent::HardwareFailed { .. })));

    // Play is no longer offered.
    rig.tap(ToggleKind::QuickRecord);
    assert_eq!(rig.panel.recorder_state(), RecorderState::NoRecording);
}

#[test]
fn shutdown_releases_the_recorder() {
    let mut rig = recorder_rig();
    rig.long_press(ToggleKind::QuickRecord);
    rig.command(PanelCommand::Shutdown);

    assert_eq!(rig.dev.count(&HwCall::StopRecording), 1);
    assert_eq!(rig.panel.next_due(), None);
}
