//! Thread-backed background lookups.
//!
//! Each request runs on its own short-lived worker thread and reports back
//! by posting a [`ControlMsg`] to the shared inbox.  Workers never touch
//! panel state; the control thread checks the generation on arrival.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::app::ports::BackgroundPort;
use crate::events::{ControlMsg, Inbox, ProfileInfo};

/// Profile data the lookups resolve against.
#[derive(Debug, Clone, Default)]
pub struct ProfileDirectory {
    pub owner: Option<ProfileInfo>,
    /// Contacts by lookup key.
    pub contacts: HashMap<String, ProfileInfo>,
}

pub struct ThreadBackground {
    inbox: Arc<Inbox>,
    directory: Arc<Mutex<ProfileDirectory>>,
    latency: Duration,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadBackground {
    pub fn new(inbox: Arc<Inbox>, directory: ProfileDirectory) -> Self {
        Self {
            inbox,
            directory: Arc::new(Mutex::new(directory)),
            latency: Duration::ZERO,
            workers: Vec::new(),
        }
    }

    /// Delay every lookup by `latency` before it reports.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Shared handle to the directory, for edits while lookups run.
    pub fn directory(&self) -> Arc<Mutex<ProfileDirectory>> {
        Arc::clone(&self.directory)
    }

    /// Wait for every spawned worker.  Returns how many were joined.
    pub fn join_all(&mut self) -> usize {
        let workers = std::mem::take(&mut self.workers);
        let count = workers.len();
        for handle in workers {
            if handle.join().is_err() {
                warn!("background: worker panicked");
            }
        }
        count
    }

    /// Workers spawned and not yet joined.
    pub fn in_flight(&self) -> usize {
        self.workers.len()
    }

    /// Join workers that have already exited so the list tracks only live
    /// threads.
    fn reap(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.workers).into_iter().partition(JoinHandle::is_finished);
        for handle in done {
            if handle.join().is_err() {
                warn!("background: worker panicked");
            }
        }
        self.workers = running;
    }

    fn spawn(&mut self, name: &str, job: impl FnOnce() -> ControlMsg + Send + 'static) {
        self.reap();
        let inbox = Arc::clone(&self.inbox);
        let latency = self.latency;
        let spawned = thread::Builder::new().name(String::from(name)).spawn(move || {
            if !latency.is_zero() {
                thread::sleep(latency);
            }
            inbox.post(job());
        });
        match spawned {
            Ok(handle) => self.workers.push(handle),
            Err(e) => warn!("background: cannot spawn {}: {}", name, e),
        }
    }
}

impl BackgroundPort for ThreadBackground {
    fn spawn_user_lookup(&mut self, generation: u32) {
        let directory = Arc::clone(&self.directory);
        self.spawn("user-lookup", move || {
            let info = directory
                .lock()
                .ok()
                .and_then(|d| d.owner.clone())
                .unwrap_or_else(|| ProfileInfo {
                    name: String::from("Owner"),
                    image: None,
                });
            debug!("background: user lookup (gen {}) -> {}", generation, info.name);
            ControlMsg::UserInfoLoaded { generation, info }
        });
    }

    fn spawn_fav_contact_lookup(&mut self, generation: u32, lookup_key: Option<String>) {
        let directory = Arc::clone(&self.directory);
        self.spawn("contact-lookup", move || {
            let info = lookup_key.and_then(|key| {
                directory.lock().ok().and_then(|d| d.contacts.get(&key).cloned())
            });
            debug!("background: contact lookup (gen {}) resolved={}", generation, info.is_some());
            ControlMsg::FavContactLoaded { generation, info }
        });
    }

    fn spawn_file_check(&mut self, path: String, epoch: u32) {
        self.spawn("file-check", move || ControlMsg::RecordingFileChecked {
            epoch,
            exists: Path::new(&path).exists(),
        });
    }
}
