#![no_main]

//! Fuzz the keyboard combination spec parser: arbitrary input must either
//! parse into combinations or return a malformed-config error, never
//! panic, and parsed output must round-trip through matching without
//! panicking either.

use libfuzzer_sys::fuzz_target;
use uibind_widgets::{Combination, KeyEvent, Modifiers};

fuzz_target!(|data: &str| {
    if let Ok(combinations) = Combination::parse_spec(data) {
        // Parsed specs are non-empty and matchable.
        assert!(!combinations.is_empty());
        let probe = KeyEvent::new(13, Modifiers::CTRL | Modifiers::SHIFT);
        for combination in &combinations {
            let _ = combination.matches(&probe);
        }
    }
});
