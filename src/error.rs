use std::path::PathBuf;
use thiserror::Error;

use crate::ir::{Dimension, ShapeType};
use crate::validation::ValidationReport;

/// The main error type for annotrack operations.
#[derive(Debug, Error)]
pub enum AnnotrackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse IR JSON from {path}: {source}")]
    IrJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write IR JSON to {path}: {source}")]
    IrJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error(
        "Track {track_id}: keyframe on frame {frame} is a {found}, but the track holds {expected} shapes"
    )]
    ShapeTypeMismatch {
        track_id: u64,
        frame: u64,
        expected: ShapeType,
        found: ShapeType,
    },

    #[error("Track {track_id}: {shape_type} shapes cannot be interpolated")]
    UnsupportedShapeType { track_id: u64, shape_type: ShapeType },

    #[error(
        "Track {track_id}: keyframe frames must strictly increase, found frame {current} after frame {previous}"
    )]
    NonIncreasingKeyframes {
        track_id: u64,
        previous: u64,
        current: u64,
    },

    #[error(
        "Track {track_id}: keyframe on frame {frame} has {right} coordinates, the previous keyframe has {left}"
    )]
    PointCountMismatch {
        track_id: u64,
        frame: u64,
        left: usize,
        right: usize,
    },

    #[error("Assignment solver failed: {0}")]
    Assignment(String),

    #[error("Cannot combine {left} and {right} annotations")]
    DimensionMismatch { left: Dimension, right: Dimension },
}
