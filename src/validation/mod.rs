//! Structural validation of an annotation IR.
//!
//! The engine refuses malformed tracks at the point where it first needs
//! them, which may be deep inside a merge. Validation walks the whole IR up
//! front and collects every problem it finds:
//! - track structure (keyframe order, one shape type per track, no masks)
//! - geometry (point counts per shape type, finite coordinates, mask runs)
//! - identity (duplicate track ids, repeated tags)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::interpolation::same_keyframe;
use crate::ir::{AnnotationIr, Dimension, LabelId, MaskRle, Shape, ShapeType, Track};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Validates an IR and returns a report of all issues found.
pub fn validate_ir(ir: &AnnotationIr, _opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_tags(ir, &mut report);

    for (index, shape) in ir.shapes.iter().enumerate() {
        validate_geometry(shape, ir.dimension, IssueContext::Shape { index }, &mut report);
    }

    let mut seen_ids: HashMap<u64, usize> = HashMap::new();
    for (idx, track) in ir.tracks.iter().enumerate() {
        // tracks built from standalone shapes all carry id 0
        if track.id != 0 {
            if let Some(first_idx) = seen_ids.get(&track.id) {
                report.add(ValidationIssue::error(
                    IssueCode::DuplicateTrackId,
                    format!(
                        "Duplicate track ID {} (first seen at index {})",
                        track.id, first_idx
                    ),
                    IssueContext::Track { id: track.id },
                ));
            } else {
                seen_ids.insert(track.id, idx);
            }
        }

        validate_track(track, ir.dimension, IssueContext::Track { id: track.id }, &mut report);
        // an element sliced past its last shape stays in the list empty
        for element in track.elements.iter().filter(|e| !e.shapes.is_empty()) {
            let context = IssueContext::Element {
                track_id: track.id,
                element_id: element.id,
            };
            validate_track(element, ir.dimension, context, &mut report);
        }
    }

    report
}

fn validate_tags(ir: &AnnotationIr, report: &mut ValidationReport) {
    let mut seen: HashSet<(u64, LabelId)> = HashSet::new();
    for (index, tag) in ir.tags.iter().enumerate() {
        if !seen.insert((tag.frame, tag.label_id)) {
            report.add(ValidationIssue::warning(
                IssueCode::DuplicateTag,
                format!(
                    "Label {} is tagged more than once on frame {}",
                    tag.label_id.as_u64(),
                    tag.frame
                ),
                IssueContext::Tag { index },
            ));
        }
    }
}

fn validate_track(
    track: &Track,
    dimension: Dimension,
    context: IssueContext,
    report: &mut ValidationReport,
) {
    let Some(first) = track.shapes.first() else {
        report.add(ValidationIssue::error(
            IssueCode::EmptyTrack,
            "Track has no keyframes",
            context,
        ));
        return;
    };

    let first_frame = track.shapes.iter().map(|s| s.frame).min().unwrap_or(first.frame);
    if track.frame != first_frame {
        report.add(ValidationIssue::warning(
            IssueCode::TrackFrameMismatch,
            format!(
                "Track starts on frame {} but its first keyframe is on frame {}",
                track.frame, first_frame
            ),
            context.clone(),
        ));
    }

    if first.shape_type == ShapeType::Mask {
        report.add(ValidationIssue::error(
            IssueCode::MaskTrack,
            "Mask shapes cannot be interpolated",
            context.clone(),
        ));
    }

    for pair in track.shapes.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);
        let keyframe = IssueContext::Keyframe {
            track_id: track.id,
            frame: current.frame,
        };

        if current.frame < prev.frame {
            report.add(ValidationIssue::error(
                IssueCode::NonIncreasingKeyframes,
                format!(
                    "Keyframe on frame {} follows keyframe on frame {}",
                    current.frame, prev.frame
                ),
                keyframe.clone(),
            ));
        } else if current.frame == prev.frame {
            if same_keyframe(prev, current) {
                report.add(ValidationIssue::warning(
                    IssueCode::DuplicateKeyframe,
                    "Repeated keyframe will be skipped",
                    keyframe.clone(),
                ));
            } else {
                report.add(ValidationIssue::error(
                    IssueCode::DuplicateKeyframe,
                    "Two different keyframes on the same frame",
                    keyframe.clone(),
                ));
            }
        }

        if current.shape_type != first.shape_type {
            report.add(ValidationIssue::error(
                IssueCode::MixedShapeTypes,
                format!(
                    "Keyframe is a {} but the track starts as a {}",
                    current.shape_type, first.shape_type
                ),
                keyframe,
            ));
        }
    }

    for shape in &track.shapes {
        let keyframe = IssueContext::Keyframe {
            track_id: track.id,
            frame: shape.frame,
        };
        validate_geometry(shape, dimension, keyframe, report);
    }
}

/// The number of coordinates a shape type needs.
enum PointCount {
    Exact(usize),
    EvenAtLeast(usize),
    AtLeast(usize),
    Any,
}

fn expected_point_count(shape_type: ShapeType, dimension: Dimension) -> PointCount {
    match shape_type {
        ShapeType::Rectangle | ShapeType::Ellipse => PointCount::Exact(4),
        ShapeType::Cuboid => match dimension {
            Dimension::Dim2d => PointCount::Exact(16),
            Dimension::Dim3d => PointCount::AtLeast(9),
        },
        ShapeType::Polygon => PointCount::EvenAtLeast(6),
        ShapeType::Polyline => PointCount::EvenAtLeast(4),
        ShapeType::Points => PointCount::EvenAtLeast(2),
        ShapeType::Skeleton => PointCount::Any,
        ShapeType::Mask => PointCount::AtLeast(4),
    }
}

fn validate_geometry(
    shape: &Shape,
    dimension: Dimension,
    context: IssueContext,
    report: &mut ValidationReport,
) {
    let len = shape.points.len();
    let problem = match expected_point_count(shape.shape_type, dimension) {
        PointCount::Exact(n) if len != n => Some(format!("exactly {}", n)),
        PointCount::EvenAtLeast(n) if len < n || len % 2 != 0 => {
            Some(format!("an even number of at least {}", n))
        }
        PointCount::AtLeast(n) if len < n => Some(format!("at least {}", n)),
        _ => None,
    };
    if let Some(expected) = problem {
        report.add(ValidationIssue::error(
            IssueCode::InvalidPointCount,
            format!(
                "A {} on frame {} has {} coordinates, expected {}",
                shape.shape_type, shape.frame, len, expected
            ),
            context.clone(),
        ));
    }

    if !shape.points.iter().all(|v| v.is_finite()) || !shape.rotation.is_finite() {
        report.add(ValidationIssue::error(
            IssueCode::PointsNotFinite,
            format!("Non-finite coordinates on frame {}", shape.frame),
            context.clone(),
        ));
    } else if shape.shape_type == ShapeType::Mask
        && len >= 4
        && !MaskRle::from_points(&shape.points).is_some_and(|rle| rle.is_consistent())
    {
        report.add(ValidationIssue::error(
            IssueCode::InconsistentMask,
            format!(
                "Mask runs on frame {} do not cover its bounding box",
                shape.frame
            ),
            context.clone(),
        ));
    }

    for element in &shape.elements {
        validate_geometry(element, dimension, context.clone(), report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Tag;

    fn rect(frame: u64, x: f64) -> Shape {
        Shape::rectangle(frame, x, 0.0, x + 10.0, 10.0).with_keyframe(true)
    }

    fn valid_ir() -> AnnotationIr {
        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        ir.add_tag(Tag::new(0, 1u64));
        ir.add_shape(Shape::polygon(2, vec![0.0, 0.0, 4.0, 0.0, 4.0, 4.0]));
        ir.add_track(Track::new(
            1,
            1u64,
            vec![rect(0, 0.0), rect(5, 10.0).with_outside(true)],
        ));
        ir
    }

    fn validate(ir: &AnnotationIr) -> ValidationReport {
        validate_ir(ir, &ValidateOptions::default())
    }

    #[test]
    fn test_valid_ir() {
        let report = validate(&valid_ir());
        assert!(
            report.is_clean(),
            "Expected no issues, got: {:?}",
            report.issues
        );
    }

    #[test]
    fn test_empty_track() {
        let mut ir = valid_ir();
        ir.add_track(Track::new(2, 1u64, vec![]));
        let report = validate(&ir);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(IssueCode::EmptyTrack));
    }

    #[test]
    fn test_keyframe_order() {
        let mut ir = valid_ir();
        ir.add_track(Track::new(2, 1u64, vec![rect(5, 0.0), rect(3, 0.0)]));
        let report = validate(&ir);
        assert_eq!(report.issues.len(), 1);
        assert!(report.has(IssueCode::NonIncreasingKeyframes));

        ir.tracks[1].frame = 0;
        assert!(validate(&ir).has(IssueCode::TrackFrameMismatch));
    }

    #[test]
    fn test_duplicate_keyframes() {
        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        let mut copy = rect(3, 0.0);
        copy.id = Some(7);
        ir.add_track(Track::new(1, 1u64, vec![rect(0, 0.0), rect(3, 0.0), copy]));
        let report = validate(&ir);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
        assert!(report.has(IssueCode::DuplicateKeyframe));

        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        ir.add_track(Track::new(1, 1u64, vec![rect(3, 0.0), rect(3, 5.0)]));
        let report = validate(&ir);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(IssueCode::DuplicateKeyframe));
    }

    #[test]
    fn test_mixed_shape_types() {
        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        ir.add_track(Track::new(
            1,
            1u64,
            vec![
                rect(0, 0.0),
                Shape::polygon(4, vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]).with_keyframe(true),
            ],
        ));
        assert!(validate(&ir).has(IssueCode::MixedShapeTypes));
    }

    #[test]
    fn test_mask_track_and_mask_runs() {
        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        // 2x2 box holds 4 pixels, runs cover 3
        let mask = Shape::new(ShapeType::Mask, 0, vec![1.0, 2.0, 0.0, 0.0, 1.0, 1.0]);
        ir.add_shape(mask.clone());
        ir.add_track(Track::new(1, 1u64, vec![mask.with_keyframe(true)]));

        let report = validate(&ir);
        assert!(report.has(IssueCode::MaskTrack));
        assert_eq!(
            report
                .issues
                .iter()
                .filter(|i| i.code == IssueCode::InconsistentMask)
                .count(),
            2
        );
    }

    #[test]
    fn test_point_counts() {
        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        ir.add_shape(Shape::new(ShapeType::Rectangle, 0, vec![0.0, 0.0, 1.0]));
        ir.add_shape(Shape::polygon(0, vec![0.0, 0.0, 1.0, 1.0]));
        ir.add_shape(Shape::new(ShapeType::Points, 0, vec![0.0, 0.0, 1.0]));
        ir.add_shape(Shape::new(ShapeType::Polyline, 0, vec![0.0, 0.0, 1.0, 1.0]));
        ir.add_shape(Shape::new(ShapeType::Cuboid, 0, vec![0.0; 9]));

        let report = validate(&ir);
        let flagged: Vec<usize> = report
            .issues
            .iter()
            .filter(|i| i.code == IssueCode::InvalidPointCount)
            .filter_map(|i| match i.context {
                IssueContext::Shape { index } => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(flagged, vec![0, 1, 2, 4]);

        // nine values describe a cuboid in point clouds
        ir.dimension = Dimension::Dim3d;
        ir.shapes.clear();
        ir.add_shape(Shape::new(ShapeType::Cuboid, 0, vec![0.0; 9]));
        assert!(validate(&ir).is_clean());
    }

    #[test]
    fn test_non_finite_points() {
        let mut ir = valid_ir();
        ir.tracks[0].shapes[0].points[1] = f64::NAN;
        let report = validate(&ir);
        assert!(report.has(IssueCode::PointsNotFinite));
        assert!(report.issues.iter().any(|i| i.context
            == IssueContext::Keyframe {
                track_id: 1,
                frame: 0
            }));
    }

    #[test]
    fn test_duplicate_track_ids() {
        let mut ir = valid_ir();
        ir.add_track(Track::new(1, 2u64, vec![rect(0, 0.0)]));
        // id 0 marks tracks built from shapes, which may repeat
        ir.add_track(Track::new(0, 2u64, vec![rect(0, 0.0)]));
        ir.add_track(Track::new(0, 2u64, vec![rect(0, 0.0)]));

        let report = validate(&ir);
        assert_eq!(report.error_count(), 1);
        assert!(report.has(IssueCode::DuplicateTrackId));
    }

    #[test]
    fn test_duplicate_tags_warn() {
        let mut ir = valid_ir();
        ir.add_tag(Tag::new(0, 1u64));
        ir.add_tag(Tag::new(1, 1u64));
        let report = validate(&ir);
        assert!(report.is_ok());
        assert_eq!(report.warning_count(), 1);
        assert!(report.has(IssueCode::DuplicateTag));
    }

    #[test]
    fn test_element_tracks_validated() {
        let mut element = Track::new(
            4,
            2u64,
            vec![Shape::new(ShapeType::Points, 3, vec![1.0, 1.0]).with_keyframe(true)],
        );
        element.frame = 0;

        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        ir.add_track(
            Track::new(
                1,
                1u64,
                vec![Shape::new(ShapeType::Skeleton, 0, vec![]).with_keyframe(true)],
            )
            .with_elements(vec![element]),
        );
        let report = validate(&ir);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, IssueCode::TrackFrameMismatch);
        assert_eq!(
            report.issues[0].context,
            IssueContext::Element {
                track_id: 1,
                element_id: 4
            }
        );
    }

    #[test]
    fn test_sliced_skeleton_with_finished_element_passes() {
        let skeleton = |frame: u64| Shape::new(ShapeType::Skeleton, frame, vec![]).with_keyframe(true);
        let point = |frame: u64| {
            Shape::new(ShapeType::Points, frame, vec![1.0, 1.0]).with_keyframe(true)
        };

        let mut ir = AnnotationIr::new(Dimension::Dim2d);
        ir.add_track(
            Track::new(1, 1u64, vec![skeleton(0), skeleton(10)]).with_elements(vec![
                Track::new(2, 2u64, vec![point(0), point(2).with_outside(true)]),
                Track::new(3, 3u64, vec![point(0), point(10)]),
            ]),
        );
        assert!(validate(&ir).is_clean());

        let sliced = ir.slice(5, 8).expect("slice");
        let elements = &sliced.tracks[0].elements;
        assert_eq!(elements.len(), 2);
        assert!(elements[0].shapes.is_empty());

        let report = validate(&sliced);
        assert!(report.is_clean(), "Expected no issues, got: {:?}", report.issues);
    }
}
