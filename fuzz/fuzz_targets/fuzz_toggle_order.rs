//! Fuzz target: `ToggleOrderConfig::parse`
//!
//! Feeds arbitrary text as the stored toggle order and asserts that the
//! result is never empty, never lists a kind twice, and survives a
//! serialize/parse cycle unchanged.
//!
//! cargo fuzz run fuzz_toggle_order

#![no_main]

use libfuzzer_sys::fuzz_target;
use quickpanel::order::{self, ToggleOrderConfig};
use quickpanel::registry::{DeviceCapabilities, ToggleKind};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };
    let cfg = ToggleOrderConfig::new(DeviceCapabilities::default());
    let parsed = cfg.parse(Some(raw));

    assert!(!parsed.is_empty(), "parse must fall back to the default order");
    assert!(parsed.len() <= ToggleKind::COUNT);
    let mut seen = [false; ToggleKind::COUNT];
    for kind in parsed.iter() {
        assert!(!seen[kind.index()], "duplicate kind in parsed order");
        seen[kind.index()] = true;
    }

    let again = cfg.parse(Some(&order::serialize(&parsed)));
    assert_eq!(again, parsed);
});
