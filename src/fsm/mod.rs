//! Table-driven state machines for the stateful tiles.
//!
//! Both machines follow the same pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌──────────────┬────────────────┬──────────┬─────────┐  │
//! │  │ state         │ label         │ icon     │ on tap  │  │
//! │  ├──────────────┼────────────────┼──────────┼─────────┤  │
//! │  │ Idle          │ "Quick record"│ …        │ Play    │  │
//! │  │ Recording     │ "Recording"   │ …        │ Stop    │  │
//! │  │ …             │               │          │         │  │
//! │  └──────────────┴────────────────┴──────────┴─────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Presentation and input mapping live in a static descriptor table indexed
//! by the state's discriminant.  Transitions are explicit methods that
//! return `Err(TransitionError)` when the current state forbids them.
//!
//! Every transition that arms a timer bumps the machine's [`Epoch`].  Timer
//! tasks carry the epoch they were armed with; a firing whose epoch no
//! longer matches is ignored, so a timer can never act on a state it was
//! not armed for.

pub mod recorder;
pub mod torch;

use crate::tiles::IconRef;

// ---------------------------------------------------------------------------
// State descriptor (one row in a machine's table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single machine state.
pub struct StateDescriptor<S: 'static, I: 'static> {
    pub id: S,
    pub name: &'static str,
    pub label: &'static str,
    pub icon: IconRef,
    /// Input a tile tap maps to in this state, if any.
    pub on_tap: Option<I>,
    /// Input a tile long-press maps to in this state, if any.
    pub on_long_press: Option<I>,
}

// ---------------------------------------------------------------------------
// Epoch
// ---------------------------------------------------------------------------

/// Transition counter used to recognise stale timer firings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Epoch(u32);

impl Epoch {
    /// Advance and return the new value.
    pub fn bump(&mut self) -> u32 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    pub fn current(self) -> u32 {
        self.0
    }

    pub fn matches(self, epoch: u32) -> bool {
        self.0 == epoch
    }
}
