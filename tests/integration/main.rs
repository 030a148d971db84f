//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific part of the
//! panel against mock adapters.  All tests run on the host with a virtual
//! clock; nothing sleeps.

mod mock_hw;
mod panel_tests;
mod recorder_tests;
mod torch_tests;
