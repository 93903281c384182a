#![no_main]

use classpool::{pool::TypeExtractor, PoolConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = TypeExtractor::new(&PoolConfig::extended()).extract(data);
});
