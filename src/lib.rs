//! QuickPanel library.
//!
//! State-reconciliation engine for a quick-toggle panel: what each tile
//! shows, when to re-poll a subsystem after a user action, how the torch
//! and quick-record tiles move between states, and how the chosen toggle
//! order is persisted.  Platform access goes through the port traits in
//! [`app::ports`]; [`adapters`] holds the host implementations.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod order;
pub mod reconcile;
pub mod registry;
pub mod tiles;
pub mod timers;
pub mod watcher;
