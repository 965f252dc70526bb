//! Axis-aligned boxes in canonical XYXY format.

use super::coord::Coord;

/// An axis-aligned box on one projection plane, stored as its min and max
/// corners.
///
/// Rectangle keyframes may be drawn from any corner, so boxes built from
/// shape points go through [`from_corners`](Self::from_corners). Mask bounds
/// are taken as written with [`from_xyxy`](Self::from_xyxy) and checked with
/// [`is_ordered`](Self::is_ordered).
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Creates an ordered box spanning two opposite corners given in any order.
    #[inline]
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::from_xyxy(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }

    /// Creates a box from its center and full extents.
    #[inline]
    pub fn from_center_size(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::from_corners(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    /// Extent along x; negative for an unordered box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along y; negative for an unordered box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// True if neither corner lies past the other on either axis.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Intersection over union of two boxes in the same plane.
    ///
    /// A box without positive area has no region to overlap, so the score is
    /// zero whenever either side is degenerate. Each axis is scaled by the
    /// larger extent first, which leaves the ratio unchanged and keeps areas
    /// of huge boxes finite.
    pub fn iou(&self, other: &Self) -> f64 {
        let (wa, ha) = (self.width(), self.height());
        let (wb, hb) = (other.width(), other.height());
        if !(wa > 0.0 && ha > 0.0 && wb > 0.0 && hb > 0.0) {
            return 0.0;
        }

        let sx = wa.max(wb);
        let sy = ha.max(hb);
        let w = (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)) / sx;
        let h = (self.max.y.min(other.max.y) - self.min.y.max(other.min.y)) / sy;
        let inter = w.max(0.0) * h.max(0.0);
        let area_a = (wa / sx) * (ha / sy);
        let area_b = (wb / sx) * (hb / sy);

        let iou = inter / (area_a + area_b - inter);
        // extents past f64::MAX leave nothing to compare
        if iou.is_finite() {
            iou.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BBoxXYXY[({}, {}) .. ({}, {})]",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}
