#![no_main]

use charref_core::{Context, ReferenceTable, Resolution, Resolver, decode_attribute, decode_text};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must not panic, and never claim more input than exists.
        let resolver = Resolver::html5();
        for context in [Context::Text, Context::AttributeValue] {
            if let Resolution::Matched { consumed, .. } = resolver.resolve(input.chars(), context) {
                assert!(consumed <= input.chars().count());
                assert!(consumed <= ReferenceTable::html5().max_name_length());
            }
        }
        let _ = decode_text(input);
        let _ = decode_attribute(input);
    }
});
