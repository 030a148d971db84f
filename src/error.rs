//! Unified error types for the quick panel.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! controller's error handling uniform.  All variants are `Copy` so they can
//! be passed through the state machines and emitted as events without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level panel error
// ---------------------------------------------------------------------------

/// Every fallible operation in the panel funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A state machine was asked for a transition its current state forbids.
    Transition(TransitionError),
    /// A hardware resource could not be acquired or driven.
    Hardware(HardwareError),
    /// An external action API rejected a command.
    Action(ActionError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transition(e) => write!(f, "transition: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Action(e) => write!(f, "action: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transition errors
// ---------------------------------------------------------------------------

/// Which machine rejected a transition, and from where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub machine: &'static str,
    pub from: &'static str,
    pub action: &'static str,
}

impl TransitionError {
    pub const fn new(machine: &'static str, from: &'static str, action: &'static str) -> Self {
        Self {
            machine,
            from,
            action,
        }
    }
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}' not allowed in {}", self.machine, self.action, self.from)
    }
}

impl From<TransitionError> for Error {
    fn from(e: TransitionError) -> Self {
        Self::Transition(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// Audio recorder could not be prepared or started.
    RecorderUnavailable,
    /// Media player could not open the recording.
    PlayerUnavailable,
    /// Camera is missing or held by another client.
    CameraUnavailable,
    /// Preview could not be started.
    PreviewFailed,
    /// Flash mode could not be set.
    FlashFailed,
    /// Wake lock could not be acquired.
    WakeLockFailed,
    /// Torch never reported ready within its confirmation budget.
    TorchNotConfirmed,
    /// Sysfs-style node write failed.
    NodeWriteFailed,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecorderUnavailable => write!(f, "recorder unavailable"),
            Self::PlayerUnavailable => write!(f, "player unavailable"),
            Self::CameraUnavailable => write!(f, "camera unavailable"),
            Self::PreviewFailed => write!(f, "preview failed"),
            Self::FlashFailed => write!(f, "flash mode failed"),
            Self::WakeLockFailed => write!(f, "wake lock failed"),
            Self::TorchNotConfirmed => write!(f, "torch not confirmed"),
            Self::NodeWriteFailed => write!(f, "node write failed"),
        }
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Action errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// The platform service behind the action is not available.
    ServiceUnavailable,
    /// The service refused the request (permission, policy).
    Rejected,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceUnavailable => write!(f, "service unavailable"),
            Self::Rejected => write!(f, "request rejected"),
        }
    }
}

impl From<ActionError> for Error {
    fn from(e: ActionError) -> Self {
        Self::Action(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Panel-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
