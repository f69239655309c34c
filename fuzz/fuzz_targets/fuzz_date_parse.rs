#![no_main]

//! Fuzz ISO date parsing: arbitrary input must parse or error, never
//! panic, and successful parses must format back to a parseable string.

use libfuzzer_sys::fuzz_target;
use uibind_scope::CivilDate;

fuzz_target!(|data: &str| {
    if let Ok(date) = CivilDate::parse_iso(data) {
        let formatted = date.to_string();
        let reparsed = CivilDate::parse_iso(&formatted).expect("formatted date reparses");
        assert_eq!(date, reparsed);
    }
});
