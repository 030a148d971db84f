//! Application core: panel orchestration with no direct platform calls.
//!
//! This module contains the composition root for the quick panel: tile
//! gestures, reconciliation, and the two stateful tiles.  All interaction
//! with the platform happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable with mock adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
