//! Sysfs node writer and file probe.
//!
//! Writes go straight to the node first.  Nodes owned by root usually
//! refuse that, so a failed direct write is retried through `sh -c` with
//! the configured shell (e.g. `su` on a rooted device).

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::app::ports::{FileProbe, ShellPort};
use crate::error::HardwareError;

pub struct SysfsShell {
    /// Program used for the privileged fallback; `None` disables it.
    fallback: Option<String>,
}

impl Default for SysfsShell {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsShell {
    /// Direct writes only.
    pub fn new() -> Self {
        Self { fallback: None }
    }

    /// Retry failed writes through `program` (run as `program -c <script>`).
    pub fn with_fallback(program: &str) -> Self {
        Self {
            fallback: Some(String::from(program)),
        }
    }

    fn write_via_shell(program: &str, path: &str, value: &str) -> Result<(), HardwareError> {
        let mut child = Command::new(program)
            .arg("-c")
            .arg(format!("cat > '{}'", path.replace('\'', "'\\''")))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                warn!("shell: cannot run {}: {}", program, e);
                HardwareError::NodeWriteFailed
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(value.as_bytes())
                .map_err(|_| HardwareError::NodeWriteFailed)?;
        }
        match child.wait() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => {
                warn!("shell: write to {} exited with {}", path, status);
                Err(HardwareError::NodeWriteFailed)
            }
            Err(_) => Err(HardwareError::NodeWriteFailed),
        }
    }
}

impl ShellPort for SysfsShell {
    fn write_node(&mut self, path: &str, value: &str) -> Result<(), HardwareError> {
        match fs::write(path, value) {
            Ok(()) => {
                debug!("shell: {} <- {}", path, value);
                Ok(())
            }
            Err(e) => match &self.fallback {
                Some(program) => {
                    debug!("shell: direct write to {} failed ({}), using {}", path, e, program);
                    Self::write_via_shell(program, path, value)
                }
                None => {
                    warn!("shell: write to {} failed: {}", path, e);
                    Err(HardwareError::NodeWriteFailed)
                }
            },
        }
    }

    fn read_node(&mut self, path: &str) -> Option<String> {
        fs::read_to_string(path).ok()
    }
}

impl FileProbe for SysfsShell {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}
