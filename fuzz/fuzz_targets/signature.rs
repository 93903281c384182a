#![no_main]

use classpool::signature::{parse_class_signature, parse_field_signature, parse_method_signature};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let _ = parse_class_signature(raw);
        let _ = parse_method_signature(raw);
        let _ = parse_field_signature(raw);
    }
});
