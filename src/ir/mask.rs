//! Run-length encoded masks.
//!
//! A mask shape stores its pixels as run lengths over the row-major bitmap of
//! its own bounding box, followed by the inclusive box corners. Runs
//! alternate between background and foreground, starting with background.

use super::bbox::BBoxXYXY;
use super::space::ImagePlane;

/// The decoded point list of a mask shape.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskRle {
    /// Alternating background/foreground run lengths.
    pub counts: Vec<u64>,

    /// Inclusive pixel bounds of the bitmap.
    pub bounds: BBoxXYXY<ImagePlane>,
}

impl MaskRle {
    /// Splits a mask point list into runs and bounds.
    ///
    /// Returns `None` when the list is too short to hold the bounds, or a run
    /// is negative, fractional or not finite.
    pub fn from_points(points: &[f64]) -> Option<Self> {
        if points.len() < 4 {
            return None;
        }
        let (runs, corners) = points.split_at(points.len() - 4);

        let mut counts = Vec::with_capacity(runs.len());
        for &run in runs {
            if !run.is_finite() || run < 0.0 || run.fract() != 0.0 {
                return None;
            }
            counts.push(run as u64);
        }

        Some(Self {
            counts,
            bounds: BBoxXYXY::from_xyxy(corners[0], corners[1], corners[2], corners[3]),
        })
    }

    /// Width of the bitmap in pixels (bounds are inclusive).
    pub fn width(&self) -> f64 {
        self.bounds.width() + 1.0
    }

    /// Height of the bitmap in pixels (bounds are inclusive).
    pub fn height(&self) -> f64 {
        self.bounds.height() + 1.0
    }

    /// Number of foreground pixels.
    ///
    /// Only sums the odd-indexed runs (which represent 1s). Runs parsed from
    /// huge coordinates saturate at `u64::MAX`, so sums are widened.
    pub fn area(&self) -> u128 {
        self.counts
            .iter()
            .skip(1)
            .step_by(2)
            .map(|&c| u128::from(c))
            .sum()
    }

    /// Total number of pixels covered by the runs.
    pub fn encoded_len(&self) -> u128 {
        self.counts.iter().map(|&c| u128::from(c)).sum()
    }

    /// Returns true if the runs cover exactly the bitmap of the bounds.
    pub fn is_consistent(&self) -> bool {
        self.bounds.is_finite()
            && self.bounds.is_ordered()
            && self.encoded_len() as f64 == self.width() * self.height()
    }
}
