//! Tile state store.
//!
//! Holds the current [`TileState`] of every toggle kind and a per-kind list
//! of refresh callbacks.  Single-threaded: the store lives on the control
//! thread and uses interior mutability so callbacks can reach back into it.
//!
//! ```text
//!   update(kind, state) ──▶ states[kind] = state
//!                      └──▶ snapshot callbacks[kind] ──▶ cb.refresh(kind, &state)
//! ```
//!
//! Callbacks are cloned out before invocation and no borrow is held while
//! they run, so a callback may register, deregister or update (even its own
//! kind) without panicking.

pub mod render;
pub mod state;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::registry::ToggleKind;

pub use render::{ExternalValue, RadioState, RingerMode, render};
pub use state::{IconRef, TilePayload, TileState};

/// Receives the new state of a tile whenever it is updated.
pub trait RefreshCallback {
    fn refresh(&self, kind: ToggleKind, state: &TileState);
}

impl<F> RefreshCallback for F
where
    F: Fn(ToggleKind, &TileState),
{
    fn refresh(&self, kind: ToggleKind, state: &TileState) {
        self(kind, state);
    }
}

/// Returned by [`TileStateStore::register`]; pass back to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle {
    pub kind: ToggleKind,
    id: u64,
}

struct CallbackEntry {
    id: u64,
    callback: Rc<dyn RefreshCallback>,
}

/// Per-kind display state plus refresh callbacks.
pub struct TileStateStore {
    states: RefCell<Vec<TileState>>,
    callbacks: RefCell<Vec<Vec<CallbackEntry>>>,
    next_id: Cell<u64>,
}

impl TileStateStore {
    pub fn new() -> Self {
        Self {
            states: RefCell::new(ToggleKind::ALL.iter().map(|k| TileState::placeholder(*k)).collect()),
            callbacks: RefCell::new((0..ToggleKind::COUNT).map(|_| Vec::new()).collect()),
            next_id: Cell::new(1),
        }
    }

    /// Add a callback for `kind`.
    pub fn register<C>(&self, kind: ToggleKind, callback: C) -> CallbackHandle
    where
        C: RefreshCallback + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.callbacks.borrow_mut()[kind.index()].push(CallbackEntry {
            id,
            callback: Rc::new(callback),
        });
        CallbackHandle { kind, id }
    }

    /// Remove a callback.  Returns `false` if it was already gone.
    pub fn deregister(&self, handle: CallbackHandle) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let list = &mut callbacks[handle.kind.index()];
        let before = list.len();
        list.retain(|entry| entry.id != handle.id);
        list.len() < before
    }

    /// Replace the stored state for `kind` and notify its callbacks.
    pub fn update(&self, kind: ToggleKind, state: TileState) {
        let snapshot = state.clone();
        self.states.borrow_mut()[kind.index()] = state;

        let callbacks: Vec<_> = self.callbacks.borrow()[kind.index()]
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for cb in callbacks {
            cb.refresh(kind, &snapshot);
        }
    }

    /// Current state of `kind`.
    pub fn get(&self, kind: ToggleKind) -> TileState {
        self.states.borrow()[kind.index()].clone()
    }

    /// Number of callbacks registered for `kind`.
    pub fn callback_count(&self, kind: ToggleKind) -> usize {
        self.callbacks.borrow()[kind.index()].len()
    }
}

impl Default for TileStateStore {
    fn default() -> Self {
        Self::new()
    }
}
