#![no_main]

use charref_core::ReferenceTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Malformed datasets must fail with an error, never a panic.
        if let Ok(table) = ReferenceTable::from_json(input) {
            assert!(table.max_name_length() > 0);
        }
    }
});
