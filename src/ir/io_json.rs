//! JSON serialization for the annotrack IR.
//!
//! The IR JSON format is the record schema of [`AnnotationIr`] serialized
//! with serde. Flat shape views and track lists produced by the conversion
//! operations are written as plain JSON arrays of the same records.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::Serialize;

use super::model::{AnnotationIr, Shape, Track};
use crate::error::AnnotrackError;

/// Reads an IR from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_ir_json(path: &Path) -> Result<AnnotationIr, AnnotrackError> {
    let file = File::open(path).map_err(AnnotrackError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| AnnotrackError::IrJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes an IR to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_ir_json(path: &Path, ir: &AnnotationIr) -> Result<(), AnnotrackError> {
    write_pretty(path, ir)
}

/// Writes a flat shape view to a JSON file.
pub fn write_shapes_json(path: &Path, shapes: &[Shape]) -> Result<(), AnnotrackError> {
    write_pretty(path, shapes)
}

/// Writes a track list to a JSON file.
pub fn write_tracks_json(path: &Path, tracks: &[Track]) -> Result<(), AnnotrackError> {
    write_pretty(path, tracks)
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AnnotrackError> {
    let file = File::create(path).map_err(AnnotrackError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value).map_err(|source| AnnotrackError::IrJsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads an IR from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<AnnotationIr, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads an IR from raw JSON bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<AnnotationIr, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes an IR to a pretty-printed JSON string.
///
/// Useful for testing without file I/O.
pub fn to_json_string(ir: &AnnotationIr) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(ir)
}

/// Fuzz-only entrypoint: whatever parses as an IR must serialize again.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_ir(bytes: &[u8]) -> Result<(), serde_json::Error> {
    let ir = from_json_slice(bytes)?;
    to_json_string(&ir).map(drop)
}
