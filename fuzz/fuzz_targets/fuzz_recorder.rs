//! Fuzz target: `RecorderMachine`
//!
//! Interprets each input byte as a gesture, a platform callback or a
//! clock step, and asserts that the recorder and player are held exactly
//! while the machine says so.
//!
//! cargo fuzz run fuzz_recorder

#![no_main]

use libfuzzer_sys::fuzz_target;
use quickpanel::app::ports::RecorderPort;
use quickpanel::config::PanelConfig;
use quickpanel::error::HardwareError;
use quickpanel::fsm::recorder::{RecorderInput, RecorderMachine, RecorderState};
use quickpanel::timers::{TimerQueue, TimerTask};

#[derive(Default)]
struct Media {
    recording: bool,
    playing: bool,
    fail_next: bool,
}

impl RecorderPort for Media {
    fn start_recording(&mut self, _path: &str) -> Result<(), HardwareError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(HardwareError::RecorderUnavailable);
        }
        self.recording = true;
        Ok(())
    }
    fn stop_recording(&mut self) {
        self.recording = false;
    }
    fn start_playback(&mut self, _path: &str) -> Result<(), HardwareError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(HardwareError::PlayerUnavailable);
        }
        self.playing = true;
        Ok(())
    }
    fn stop_playback(&mut self) {
        self.playing = false;
    }
}

fuzz_target!(|data: &[u8]| {
    let mut machine = RecorderMachine::new(&PanelConfig::default());
    let mut timers = TimerQueue::new();
    let mut media = Media::default();
    let mut now = 0u64;

    for byte in data {
        match byte % 8 {
            0 => {
                let _ = machine.handle(RecorderInput::Start, now, &mut timers, &mut media);
            }
            1 => {
                let _ = machine.handle(RecorderInput::Stop, now, &mut timers, &mut media);
            }
            2 => {
                let _ = machine.handle(RecorderInput::Play, now, &mut timers, &mut media);
            }
            3 => {
                machine.playback_completed(&mut timers, &mut media);
            }
            4 => machine.file_missing(&mut timers, &mut media),
            5 => {
                machine.file_found(&mut timers);
            }
            6 => media.fail_next = true,
            _ => {
                now += u64::from(*byte) * 1_000;
                while let Some(due) = timers.next_due().filter(|d| *d <= now) {
                    match timers.pop_due(due) {
                        Some(TimerTask::RecorderAutoStop { epoch }) => {
                            machine.on_auto_stop(epoch, due, &mut timers, &mut media);
                        }
                        Some(TimerTask::RecorderRevert { epoch }) => {
                            machine.on_revert(epoch, &mut timers);
                        }
                        _ => {}
                    }
                }
            }
        }

        let state = machine.state();
        assert_eq!(media.recording, state == RecorderState::Recording);
        assert_eq!(media.playing, state == RecorderState::Playing);
        assert!(timers.len() <= 1, "at most one recorder timer may be queued");
    }
});
