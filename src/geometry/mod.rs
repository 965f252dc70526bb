//! Geometric similarity between shapes.
//!
//! Similarity is a score in `[0, 1]` used by the merge step to decide
//! whether two annotations drawn by different annotators describe the same
//! object. Only rectangles, polygons and 3D cuboids have a similarity
//! measure; every other pair scores zero and therefore never matches.

mod polygon;

pub use polygon::{polygon_iou, simple_polygon};

use crate::ir::{BBoxXYXY, Dimension, ImagePlane, Shape, ShapeType, SideView, TopView};

/// A point on the image plane used by curve computations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear blend towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(&self, other: &Point2, t: f64) -> Point2 {
        Point2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Groups a flat `[x0, y0, x1, y1, ...]` list into points. A trailing odd
    /// value is ignored.
    pub fn from_flat(points: &[f64]) -> Vec<Point2> {
        points
            .chunks_exact(2)
            .map(|pair| Point2::new(pair[0], pair[1]))
            .collect()
    }

    /// Flattens points back into `[x0, y0, x1, y1, ...]`.
    pub fn to_flat(points: &[Point2]) -> Vec<f64> {
        points.iter().flat_map(|p| [p.x, p.y]).collect()
    }
}

/// Similarity of two shapes in `[0, 1]`.
///
/// Shapes of different types or labels score zero. Rectangles are compared
/// as axis-aligned boxes; their rotation is ignored.
pub fn shape_similarity(a: &Shape, b: &Shape, dimension: Dimension) -> f64 {
    if a.label_id != b.label_id {
        return 0.0;
    }
    geometry_similarity(a, b, dimension)
}

/// Like [`shape_similarity`], but compares geometry only. Used for the
/// keyframes of tracks, whose label lives on the track.
pub fn geometry_similarity(a: &Shape, b: &Shape, dimension: Dimension) -> f64 {
    if a.shape_type != b.shape_type {
        return 0.0;
    }

    match (a.shape_type, dimension) {
        (ShapeType::Rectangle, _) => rectangle_iou(&a.points, &b.points),
        (ShapeType::Polygon, _) => polygon_iou(&a.points, &b.points),
        (ShapeType::Cuboid, Dimension::Dim3d) => cuboid_3d_similarity(&a.points, &b.points),
        // TODO: points, polylines, ellipses and 2D cuboids have no similarity
        // measure yet, so they never match during a merge.
        _ => 0.0,
    }
}

fn image_box(points: &[f64]) -> Option<BBoxXYXY<ImagePlane>> {
    match points {
        [x1, y1, x2, y2, ..] => Some(BBoxXYXY::from_corners(*x1, *y1, *x2, *y2)),
        _ => None,
    }
}

fn rectangle_iou(a: &[f64], b: &[f64]) -> f64 {
    match (image_box(a), image_box(b)) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => a.iou(&b),
        _ => 0.0,
    }
}

/// Top-down and side projections of a 3D cuboid.
fn cuboid_projections(points: &[f64]) -> Option<(BBoxXYXY<TopView>, BBoxXYXY<SideView>)> {
    if points.len() < 9 {
        return None;
    }
    let (cx, cy, cz) = (points[0], points[1], points[2]);
    let (sx, sy, sz) = (points[6], points[7], points[8]);

    Some((
        BBoxXYXY::from_center_size(cx, cy, sx, sy),
        BBoxXYXY::from_center_size(cx, cz, sx, sz),
    ))
}

fn cuboid_3d_similarity(a: &[f64], b: &[f64]) -> f64 {
    match (cuboid_projections(a), cuboid_projections(b)) {
        (Some((top_a, side_a)), Some((top_b, side_b))) => {
            top_a.iou(&top_b) * side_a.iou(&side_b)
        }
        _ => 0.0,
    }
}
