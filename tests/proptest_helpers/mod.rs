#![allow(dead_code)]

use std::collections::BTreeSet;

use annotrack::ir::{AnnotationIr, Dimension, Shape, Tag, Track};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Tolerance for coordinates produced through different chains of linear
/// blends.
pub const EPS_LINEAR: f64 = 1e-6;

/// Frames are drawn from `0..MAX_FRAME`.
pub const MAX_FRAME: u64 = 40;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A coordinate on a quarter-pixel grid, exact in binary floating point.
fn coord() -> impl Strategy<Value = f64> {
    (0u16..=2000).prop_map(|v| v as f64 / 4.0)
}

type RectSeed = (f64, f64, f64, f64, bool);

fn rect_seed() -> impl Strategy<Value = RectSeed> {
    (
        coord(),
        coord(),
        1u16..=400,
        1u16..=400,
        prop::bool::weighted(0.25),
    )
        .prop_map(|(x, y, w, h, outside)| (x, y, w as f64 / 4.0, h as f64 / 4.0, outside))
}

/// A rectangle track with strictly increasing keyframes, some of them
/// outside.
pub fn arb_rect_track(id: u64, max_keyframes: usize) -> BoxedStrategy<Track> {
    assert!(max_keyframes > 0, "max_keyframes must be > 0");

    proptest::collection::btree_set(0..MAX_FRAME, 1..=max_keyframes)
        .prop_flat_map(move |frames: BTreeSet<u64>| {
            let count = frames.len();
            (
                Just(frames),
                proptest::collection::vec(rect_seed(), count..=count),
                1u64..=3,
            )
                .prop_map(move |(frames, seeds, label)| {
                    let shapes = frames
                        .into_iter()
                        .zip(seeds)
                        .map(|(frame, (x, y, w, h, outside))| {
                            Shape::rectangle(frame, x, y, x + w, y + h)
                                .with_label(label)
                                .with_keyframe(true)
                                .with_outside(outside)
                        })
                        .collect();
                    Track::new(id, label, shapes)
                })
        })
        .boxed()
}

/// A 2D IR with rectangle tracks, standalone rectangles and tags.
pub fn arb_ir(
    max_tracks: usize,
    max_shapes: usize,
    max_tags: usize,
) -> BoxedStrategy<AnnotationIr> {
    let tracks = (0usize..=max_tracks).prop_flat_map(|count| {
        (0..count)
            .map(|idx| arb_rect_track(idx as u64 + 1, 6))
            .collect::<Vec<_>>()
    });
    let shapes = proptest::collection::vec(
        (0..MAX_FRAME, coord(), coord(), 1u64..=3),
        0..=max_shapes,
    );
    let tags = proptest::collection::vec((0..MAX_FRAME, 1u64..=3), 0..=max_tags);

    (tracks, shapes, tags)
        .prop_map(|(tracks, shapes, tags)| {
            let mut ir = AnnotationIr::new(Dimension::Dim2d);
            for track in tracks {
                ir.add_track(track);
            }
            for (frame, x, y, label) in shapes {
                ir.add_shape(Shape::rectangle(frame, x, y, x + 8.0, y + 8.0).with_label(label));
            }
            for (frame, label) in tags {
                ir.add_tag(Tag::new(frame, label));
            }
            ir
        })
        .boxed()
}

/// Visible frames of a per-frame shape list, with their points.
pub fn visible(shapes: &[Shape]) -> Vec<(u64, Vec<f64>)> {
    shapes
        .iter()
        .filter(|s| !s.outside)
        .map(|s| (s.frame, s.points.clone()))
        .collect()
}

pub fn points_close(a: &[f64], b: &[f64], eps: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= eps)
}
