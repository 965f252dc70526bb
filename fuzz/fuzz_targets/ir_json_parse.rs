//! Arbitrary bytes into the IR JSON reader; anything it accepts must
//! serialize again.

#![no_main]

use annotrack::ir::io_json::fuzz_parse_ir;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4 * 1024 * 1024 {
        return;
    }

    let _ = fuzz_parse_ir(data);
});
