//! Fuzz target for the engine operations on parsed IRs.
//!
//! Any IR that parses is validated, sliced and materialized. Malformed
//! tracks must surface as errors, never as panics.

#![no_main]

use annotrack::ir::io_json::from_json_slice;
use annotrack::ir::{ShapeViewOptions, Track};
use annotrack::validation::{validate_ir, ValidateOptions};
use libfuzzer_sys::fuzz_target;

/// Keeps per-frame expansion small.
const MAX_FRAME: u64 = 256;

fn latest_frame(track: &Track) -> u64 {
    let own = track.shapes.iter().map(|s| s.frame).fold(track.frame, u64::max);
    track.elements.iter().map(latest_frame).fold(own, u64::max)
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(ir) = from_json_slice(data) else {
        return;
    };
    if ir.tracks.iter().any(|t| latest_frame(t) > MAX_FRAME) {
        return;
    }

    let _ = validate_ir(&ir, &ValidateOptions::default());
    let _ = ir.slice(MAX_FRAME / 4, MAX_FRAME / 2);
    let _ = ir.to_shapes(&ShapeViewOptions {
        end_frame: MAX_FRAME,
        ..Default::default()
    });
});
