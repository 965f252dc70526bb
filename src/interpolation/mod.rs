//! Keyframe interpolation.
//!
//! A track stores only the shapes an annotator drew by hand. This module
//! expands those keyframes into one shape per frame:
//!
//! - rectangles, ellipses, cuboids and skeletons blend every coordinate
//!   linearly and turn along the shortest arc
//! - 3D cuboids additionally blend their Euler angles
//! - a single point moves linearly, larger point sets are held constant
//! - polygons and polylines use [`interpolate_polyshape`], which copes with
//!   keyframes of different vertex counts
//!
//! Frames after an outside keyframe stay empty until the next keyframe, and
//! a track whose last keyframe is visible is propagated to the end of the
//! requested range.

mod angle;
mod polyshape;

pub use angle::{interpolate_euler, interpolate_rotation, shortest_arc};
pub use polyshape::interpolate_polyshape;

use std::collections::BTreeSet;

use tracing::warn;

use crate::error::AnnotrackError;
use crate::ir::{Dimension, Shape, ShapeType, Track};

/// Options for [`get_interpolated_shapes`].
#[derive(Clone, Copy, Debug, Default)]
pub struct InterpolationOptions<'a> {
    /// If set, only these frames are emitted. Keyframes on other frames still
    /// drive the interpolation.
    pub included_frames: Option<&'a BTreeSet<u64>>,

    /// Materialize the frames between an outside keyframe and the next
    /// keyframe as outside copies instead of leaving them empty.
    pub include_outside: bool,

    /// Frames treated as absent from the timeline; keyframes on them are
    /// ignored entirely.
    pub deleted_frames: Option<&'a BTreeSet<u64>>,
}

impl InterpolationOptions<'_> {
    fn wants(&self, frame: u64) -> bool {
        self.included_frames.map_or(true, |set| set.contains(&frame))
    }

    fn is_deleted(&self, frame: u64) -> bool {
        self.deleted_frames.is_some_and(|set| set.contains(&frame))
    }
}

/// Expands the keyframes of `track` into shapes for every frame in
/// `[start_frame, end_frame)` that is not before `track.frame`.
///
/// Keyframes come back with `keyframe = true`, synthesized shapes with
/// `keyframe = false` and no id. Shapes are ordered by frame.
///
/// # Errors
/// Fails if the track holds a mask, mixes shape types, has keyframes that do
/// not strictly increase, or a linear span whose endpoints differ in point
/// count.
pub fn get_interpolated_shapes(
    track: &Track,
    start_frame: u64,
    end_frame: u64,
    dimension: Dimension,
    options: &InterpolationOptions<'_>,
) -> Result<Vec<Shape>, AnnotrackError> {
    if let Some(mask) = track
        .shapes
        .iter()
        .find(|s| s.shape_type == ShapeType::Mask)
    {
        return Err(AnnotrackError::UnsupportedShapeType {
            track_id: track.id,
            shape_type: mask.shape_type,
        });
    }

    let mut keyframes: Vec<&Shape> = track
        .shapes
        .iter()
        .filter(|s| !options.is_deleted(s.frame))
        .collect();
    keyframes.sort_by_key(|s| s.frame);

    let mut shapes = Vec::new();
    let mut prev: Option<Shape> = None;
    let mut prev_raw: Option<&Shape> = None;
    let mut finished = false;

    for &raw in &keyframes {
        let mut current = raw.clone();
        current.keyframe = true;

        if let Some(prev_shape) = prev.as_ref() {
            if raw.frame == prev_shape.frame && prev_raw.is_some_and(|p| same_keyframe(p, raw)) {
                warn!(
                    track_id = track.id,
                    frame = raw.frame,
                    "skipping duplicate keyframe"
                );
                continue;
            }
            if raw.frame <= prev_shape.frame {
                return Err(AnnotrackError::NonIncreasingKeyframes {
                    track_id: track.id,
                    previous: prev_shape.frame,
                    current: raw.frame,
                });
            }
            if raw.shape_type != prev_shape.shape_type {
                return Err(AnnotrackError::ShapeTypeMismatch {
                    track_id: track.id,
                    frame: raw.frame,
                    expected: prev_shape.shape_type,
                    found: raw.shape_type,
                });
            }

            inherit_attributes(prev_shape, &mut current);
            let span = fill_gap(track.id, prev_shape, &current, dimension, options)?;

            if end_frame <= current.frame {
                shapes.extend(span.into_iter().filter(|s| s.frame < end_frame));
                finished = true;
                break;
            }
            shapes.extend(span);
        }

        shapes.push(current.clone());
        prev = Some(current);
        prev_raw = Some(raw);
    }

    if !finished {
        if let Some(last) = prev.filter(|p| !p.outside) {
            for frame in last.frame.saturating_add(1)..end_frame {
                if options.wants(frame) {
                    shapes.push(copy_shape(&last, frame, last.points.clone(), last.rotation));
                }
            }
        }
    }

    let lower = start_frame.max(track.frame);
    shapes.retain(|s| {
        s.frame >= lower
            && s.frame < end_frame
            && (s.keyframe || !s.outside || options.include_outside)
            && options.wants(s.frame)
    });

    Ok(shapes)
}

/// Two keyframes on one frame are duplicates if they agree on everything but
/// their id and keyframe flag.
pub(crate) fn same_keyframe(a: &Shape, b: &Shape) -> bool {
    let strip = |s: &Shape| Shape {
        id: None,
        keyframe: false,
        ..s.clone()
    };
    strip(a) == strip(b)
}

fn inherit_attributes(prev: &Shape, current: &mut Shape) {
    for attr in &prev.attributes {
        if !current.attributes.iter().any(|a| a.spec_id == attr.spec_id) {
            current.attributes.push(attr.clone());
        }
    }
}

/// A synthesized, non-keyframe copy of `source` on another frame.
fn copy_shape(source: &Shape, frame: u64, points: Vec<f64>, rotation: f64) -> Shape {
    Shape {
        id: None,
        frame,
        points,
        rotation,
        keyframe: false,
        ..source.clone()
    }
}

/// Shapes strictly between two consecutive keyframes.
fn fill_gap(
    track_id: u64,
    left: &Shape,
    right: &Shape,
    dimension: Dimension,
    options: &InterpolationOptions<'_>,
) -> Result<Vec<Shape>, AnnotrackError> {
    if left.outside {
        if !options.include_outside {
            return Ok(Vec::new());
        }
        return Ok(((left.frame + 1)..right.frame)
            .filter(|&f| options.wants(f))
            .map(|f| copy_shape(left, f, left.points.clone(), left.rotation))
            .collect());
    }

    let distance = (right.frame - left.frame) as f64;
    let frames: Vec<(u64, f64)> = ((left.frame + 1)..right.frame)
        .filter(|&f| options.wants(f))
        .map(|f| (f, (f - left.frame) as f64 / distance))
        .collect();

    let shapes = match left.shape_type {
        ShapeType::Rectangle | ShapeType::Ellipse | ShapeType::Cuboid | ShapeType::Skeleton => {
            check_point_counts(track_id, left, right)?;
            let euler = left.shape_type == ShapeType::Cuboid && dimension == Dimension::Dim3d;
            frames
                .iter()
                .map(|&(frame, t)| linear_shape(left, right, frame, t, euler))
                .collect()
        }
        ShapeType::Points if left.points.len() == 2 && right.points.len() == 2 => frames
            .iter()
            .map(|&(frame, t)| linear_shape(left, right, frame, t, false))
            .collect(),
        ShapeType::Points => frames
            .iter()
            .map(|&(frame, _)| copy_shape(left, frame, left.points.clone(), left.rotation))
            .collect(),
        ShapeType::Polygon | ShapeType::Polyline => {
            let closed = left.shape_type == ShapeType::Polygon;
            frames
                .iter()
                .map(|&(frame, t)| {
                    let points = interpolate_polyshape(&left.points, &right.points, t, closed);
                    copy_shape(left, frame, points, left.rotation)
                })
                .collect()
        }
        ShapeType::Mask => {
            return Err(AnnotrackError::UnsupportedShapeType {
                track_id,
                shape_type: left.shape_type,
            })
        }
    };

    Ok(shapes)
}

fn check_point_counts(track_id: u64, left: &Shape, right: &Shape) -> Result<(), AnnotrackError> {
    if left.points.len() != right.points.len() {
        return Err(AnnotrackError::PointCountMismatch {
            track_id,
            frame: right.frame,
            left: left.points.len(),
            right: right.points.len(),
        });
    }
    Ok(())
}

fn linear_shape(left: &Shape, right: &Shape, frame: u64, t: f64, euler: bool) -> Shape {
    let mut points: Vec<f64> = left
        .points
        .iter()
        .zip(&right.points)
        .map(|(a, b)| a + (b - a) * t)
        .collect();

    if euler && points.len() >= 6 {
        for i in 3..6 {
            points[i] = interpolate_euler(left.points[i], right.points[i], t);
        }
    }

    let rotation = interpolate_rotation(left.rotation, right.rotation, t);
    copy_shape(left, frame, points, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Attribute, Dimension, Shape, Track};

    fn rect(frame: u64, x: f64) -> Shape {
        Shape::rectangle(frame, x, 0.0, x + 10.0, 10.0).with_keyframe(true)
    }

    fn frames(shapes: &[Shape]) -> Vec<u64> {
        shapes.iter().map(|s| s.frame).collect()
    }

    fn interpolate(track: &Track, start: u64, end: u64) -> Vec<Shape> {
        get_interpolated_shapes(
            track,
            start,
            end,
            Dimension::Dim2d,
            &InterpolationOptions::default(),
        )
        .expect("interpolation")
    }

    #[test]
    fn test_round_trip_example() {
        let track = Track::new(
            1,
            1u64,
            vec![
                Shape::rectangle(0, 1.0, 2.0, 3.0, 4.0),
                Shape::rectangle(2, 3.0, 4.0, 5.0, 6.0).with_outside(true),
            ],
        );

        let shapes = interpolate(&track, 0, 3);
        assert_eq!(frames(&shapes), vec![0, 1, 2]);

        assert!(shapes[0].keyframe && !shapes[0].outside);
        assert_eq!(shapes[0].points, vec![1.0, 2.0, 3.0, 4.0]);

        assert!(!shapes[1].keyframe && !shapes[1].outside);
        assert_eq!(shapes[1].points, vec![2.0, 3.0, 4.0, 5.0]);

        assert!(shapes[2].keyframe && shapes[2].outside);
        assert_eq!(shapes[2].points, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_outside_gap_is_suppressed() {
        let track = Track::new(
            1,
            1u64,
            vec![rect(0, 0.0), rect(2, 0.0).with_outside(true), rect(4, 0.0)],
        );

        let shapes = interpolate(&track, 0, 7);
        assert_eq!(frames(&shapes), vec![0, 1, 2, 4, 5, 6]);
        assert!(shapes[2].keyframe && shapes[2].outside);
    }

    #[test]
    fn test_outside_gap_included_on_request() {
        let track = Track::new(
            1,
            1u64,
            vec![rect(0, 0.0), rect(2, 0.0).with_outside(true), rect(4, 0.0)],
        );
        let options = InterpolationOptions {
            include_outside: true,
            ..Default::default()
        };

        let shapes =
            get_interpolated_shapes(&track, 0, 7, Dimension::Dim2d, &options).expect("ok");
        assert_eq!(frames(&shapes), vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(shapes[3].outside && !shapes[3].keyframe);
    }

    #[test]
    fn test_trailing_outside_stops_propagation() {
        let track = Track::new(1, 1u64, vec![rect(0, 0.0), rect(3, 0.0).with_outside(true)]);
        assert_eq!(frames(&interpolate(&track, 0, 10)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_propagation_to_end_frame() {
        let track = Track::new(1, 1u64, vec![rect(2, 5.0)]);
        let shapes = interpolate(&track, 0, 6);

        assert_eq!(frames(&shapes), vec![2, 3, 4, 5]);
        assert!(shapes[0].keyframe);
        assert!(shapes[1..].iter().all(|s| !s.keyframe && s.id.is_none()));
        assert!(shapes.iter().all(|s| s.points == shapes[0].points));
    }

    #[test]
    fn test_keyframe_on_last_frame_does_not_propagate() {
        let track = Track::new(1, 1u64, vec![rect(u64::MAX, 0.0)]);
        assert!(interpolate(&track, 0, 10).is_empty());
        assert!(interpolate(&track, 0, u64::MAX).is_empty());

        let mut ir = crate::ir::AnnotationIr::new(Dimension::Dim2d);
        ir.add_track(track);
        let view = crate::ir::ShapeViewOptions {
            end_frame: 10,
            ..Default::default()
        };
        assert!(ir.to_shapes(&view).expect("shapes").is_empty());
    }

    #[test]
    fn test_span_clipped_at_end_frame() {
        let track = Track::new(1, 1u64, vec![rect(0, 0.0), rect(10, 100.0)]);
        let shapes = interpolate(&track, 0, 4);

        assert_eq!(frames(&shapes), vec![0, 1, 2, 3]);
        assert_eq!(shapes[3].points[0], 30.0);
    }

    #[test]
    fn test_start_frame_and_included_frames() {
        let track = Track::new(1, 1u64, vec![rect(0, 0.0), rect(10, 100.0)]);
        let included: BTreeSet<u64> = [1, 4, 10, 12].into_iter().collect();
        let options = InterpolationOptions {
            included_frames: Some(&included),
            ..Default::default()
        };

        let shapes =
            get_interpolated_shapes(&track, 2, 12, Dimension::Dim2d, &options).expect("ok");
        assert_eq!(frames(&shapes), vec![4, 10]);
        assert_eq!(shapes[0].points[0], 40.0);
    }

    #[test]
    fn test_deleted_keyframe_is_transparent() {
        let with_middle = Track::new(1, 1u64, vec![rect(0, 0.0), rect(2, 50.0), rect(4, 40.0)]);
        let without_middle = Track::new(1, 1u64, vec![rect(0, 0.0), rect(4, 40.0)]);
        let deleted: BTreeSet<u64> = [2].into_iter().collect();
        let options = InterpolationOptions {
            deleted_frames: Some(&deleted),
            ..Default::default()
        };

        let skipped =
            get_interpolated_shapes(&with_middle, 0, 6, Dimension::Dim2d, &options).expect("ok");
        let reference = get_interpolated_shapes(
            &without_middle,
            0,
            6,
            Dimension::Dim2d,
            &InterpolationOptions {
                deleted_frames: Some(&deleted),
                ..Default::default()
            },
        )
        .expect("ok");

        assert_eq!(skipped, reference);
        assert_eq!(skipped[1].points[0], 10.0);
    }

    #[test]
    fn test_duplicate_keyframe_collapses() {
        let mut duplicate = rect(3, 0.0);
        duplicate.id = Some(99);
        let track = Track::new(
            1,
            1u64,
            vec![rect(0, 0.0), rect(3, 0.0), duplicate, rect(5, 0.0)],
        );

        let shapes = interpolate(&track, 0, 6);
        assert_eq!(frames(&shapes), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_conflicting_keyframes_on_one_frame() {
        let track = Track::new(1, 1u64, vec![rect(0, 0.0), rect(3, 0.0), rect(3, 5.0)]);
        let err = get_interpolated_shapes(
            &track,
            0,
            6,
            Dimension::Dim2d,
            &InterpolationOptions::default(),
        )
        .expect_err("conflicting keyframes");

        assert!(matches!(
            err,
            AnnotrackError::NonIncreasingKeyframes {
                track_id: 1,
                previous: 3,
                current: 3
            }
        ));
    }

    #[test]
    fn test_mixed_types_rejected() {
        let track = Track::new(
            7,
            1u64,
            vec![
                rect(0, 0.0),
                Shape::polygon(4, vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]).with_keyframe(true),
            ],
        );
        let err = get_interpolated_shapes(
            &track,
            0,
            6,
            Dimension::Dim2d,
            &InterpolationOptions::default(),
        )
        .expect_err("mixed types");

        assert!(matches!(
            err,
            AnnotrackError::ShapeTypeMismatch {
                track_id: 7,
                frame: 4,
                expected: ShapeType::Rectangle,
                found: ShapeType::Polygon
            }
        ));
    }

    #[test]
    fn test_mask_track_rejected() {
        let track = Track::new(
            3,
            1u64,
            vec![Shape::new(ShapeType::Mask, 0, vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0])],
        );
        let err = get_interpolated_shapes(
            &track,
            0,
            2,
            Dimension::Dim2d,
            &InterpolationOptions::default(),
        )
        .expect_err("mask");
        assert!(matches!(
            err,
            AnnotrackError::UnsupportedShapeType {
                track_id: 3,
                shape_type: ShapeType::Mask
            }
        ));
    }

    #[test]
    fn test_point_count_mismatch() {
        let mut broken = rect(2, 0.0);
        broken.points.push(1.0);
        let track = Track::new(4, 1u64, vec![rect(0, 0.0), broken]);

        let err = get_interpolated_shapes(
            &track,
            0,
            4,
            Dimension::Dim2d,
            &InterpolationOptions::default(),
        )
        .expect_err("mismatch");
        assert!(matches!(
            err,
            AnnotrackError::PointCountMismatch {
                track_id: 4,
                frame: 2,
                left: 4,
                right: 5
            }
        ));
    }

    #[test]
    fn test_attributes_inherited_forward() {
        let track = Track::new(
            1,
            1u64,
            vec![
                rect(0, 0.0).with_attribute(1u64, "red").with_attribute(2u64, "big"),
                rect(2, 0.0).with_attribute(2u64, "small"),
                rect(4, 0.0),
            ],
        );

        let shapes = interpolate(&track, 0, 5);
        let at = |frame: u64| &shapes[frame as usize].attributes;

        assert_eq!(
            at(2),
            &vec![Attribute::new(2u64, "small"), Attribute::new(1u64, "red")]
        );
        assert_eq!(at(3), at(2));
        assert_eq!(
            at(4),
            &vec![Attribute::new(2u64, "small"), Attribute::new(1u64, "red")]
        );
    }

    #[test]
    fn test_rotation_follows_shortest_arc() {
        let track = Track::new(
            1,
            1u64,
            vec![rect(0, 0.0).with_rotation(350.0), rect(2, 0.0).with_rotation(10.0)],
        );
        let shapes = interpolate(&track, 0, 3);
        assert!(shapes[1].rotation.abs() < 1e-9);
    }

    #[test]
    fn test_points_rules() {
        let single = Track::new(
            1,
            1u64,
            vec![
                Shape::new(ShapeType::Points, 0, vec![0.0, 0.0]).with_keyframe(true),
                Shape::new(ShapeType::Points, 2, vec![4.0, 2.0]).with_keyframe(true),
            ],
        );
        assert_eq!(interpolate(&single, 0, 2)[1].points, vec![2.0, 1.0]);

        let many = Track::new(
            1,
            1u64,
            vec![
                Shape::new(ShapeType::Points, 0, vec![0.0, 0.0, 1.0, 1.0]).with_keyframe(true),
                Shape::new(ShapeType::Points, 2, vec![4.0, 2.0]).with_keyframe(true),
            ],
        );
        assert_eq!(interpolate(&many, 0, 2)[1].points, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_cuboid_3d_angles() {
        let mut a = vec![0.0; 16];
        let mut b = vec![0.0; 16];
        a[3] = 170f64.to_radians();
        b[3] = (-170f64).to_radians();
        b[0] = 2.0;
        let track = Track::new(
            1,
            1u64,
            vec![
                Shape::new(ShapeType::Cuboid, 0, a).with_keyframe(true),
                Shape::new(ShapeType::Cuboid, 4, b).with_keyframe(true),
            ],
        );

        let shapes = get_interpolated_shapes(
            &track,
            0,
            5,
            Dimension::Dim3d,
            &InterpolationOptions::default(),
        )
        .expect("ok");

        assert_eq!(shapes[2].points[0], 1.0);
        assert!((shapes[1].points[3] - 175f64.to_radians()).abs() < 1e-9);
        assert!((shapes[3].points[3] - (-175f64).to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_span() {
        let square = vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];
        let moved: Vec<f64> = square.iter().map(|v| v + 2.0).collect();
        let track = Track::new(
            1,
            1u64,
            vec![
                Shape::polygon(0, square).with_keyframe(true),
                Shape::polygon(2, moved).with_keyframe(true),
            ],
        );

        let shapes = interpolate(&track, 0, 3);
        assert_eq!(
            shapes[1].points,
            vec![1.0, 1.0, 11.0, 1.0, 11.0, 11.0, 1.0, 11.0]
        );
    }

    #[test]
    fn test_track_frame_lower_bound() {
        let mut track = Track::new(1, 1u64, vec![rect(0, 0.0), rect(4, 0.0)]);
        track.frame = 2;
        assert_eq!(frames(&interpolate(&track, 0, 5)), vec![2, 3, 4]);
    }
}
