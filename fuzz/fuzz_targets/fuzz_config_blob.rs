//! Fuzz target: persisted config blob
//!
//! Decodes arbitrary bytes as a stored `PanelConfig`.  Decoding may fail,
//! but must not panic; anything that decodes and validates must be
//! accepted by the store and load back unchanged.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use quickpanel::adapters::store::{MemoryStore, validate_config};
use quickpanel::app::ports::ConfigPort;
use quickpanel::config::PanelConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = postcard::from_bytes::<PanelConfig>(data) else {
        return;
    };
    let store = MemoryStore::new();
    match validate_config(&cfg) {
        Ok(()) => {
            if store.save(&cfg).is_ok() {
                assert_eq!(store.load(), Ok(cfg));
            }
        }
        Err(_) => assert!(store.save(&cfg).is_err()),
    }
});
