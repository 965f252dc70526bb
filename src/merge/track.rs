use std::collections::BTreeMap;

use super::{MergeWindow, ObjectKind};
use crate::error::AnnotrackError;
use crate::geometry::geometry_similarity;
use crate::interpolation::{get_interpolated_shapes, InterpolationOptions};
use crate::ir::{Shape, Track};

/// Tracks match by how closely their interpolated shapes agree over the
/// overlap window.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackKind;

impl TrackKind {
    /// A track takes part in matching unless it ended before the window.
    fn is_candidate(track: &Track, window: &MergeWindow) -> bool {
        track
            .last_keyframe()
            .is_some_and(|last| last.frame >= window.start_frame || !last.outside)
    }
}

impl ObjectKind for TrackKind {
    type Object = Track;

    fn name(&self) -> &'static str {
        "track"
    }

    fn cost_threshold(&self) -> f64 {
        0.5
    }

    fn frame(&self, track: &Track) -> u64 {
        track.frame
    }

    // all tracks are compared with each other, so they share one group
    fn existing_group(&self, track: &Track, window: &MergeWindow) -> Option<u64> {
        Self::is_candidate(track, window).then_some(0)
    }

    fn incoming_group(&self, track: &Track, window: &MergeWindow) -> Option<u64> {
        Self::is_candidate(track, window).then_some(0)
    }

    fn similarity(
        &self,
        a: &Track,
        b: &Track,
        window: &MergeWindow,
    ) -> Result<f64, AnnotrackError> {
        track_similarity(a, b, window)
    }

    fn unite(&self, incoming: Track, existing: &mut Track) {
        *existing = unite_tracks(incoming, std::mem::take(existing));
    }

    fn close_out(&self, track: &mut Track, boundary: u64) {
        close_out_track(track, boundary);
    }
}

/// Agreement of two tracks over the overlap window, in `[0, 1]`.
///
/// Every frame where at least one track has a shape counts once. A frame
/// where both are visible (or both outside) costs one minus their geometric
/// similarity; a frame where only one side is present or the outside flags
/// disagree costs one. A window where neither track has a shape scores zero.
pub fn track_similarity(a: &Track, b: &Track, window: &MergeWindow) -> Result<f64, AnnotrackError> {
    if a.label_id != b.label_id {
        return Ok(0.0);
    }

    let end = window.end();
    let sample = |track: &Track| -> Result<BTreeMap<u64, Shape>, AnnotrackError> {
        let shapes = get_interpolated_shapes(
            track,
            window.start_frame,
            end,
            window.dimension,
            &InterpolationOptions::default(),
        )?;
        Ok(shapes.into_iter().map(|s| (s.frame, s)).collect())
    };
    let shapes_a = sample(a)?;
    let shapes_b = sample(b)?;

    let mut error = 0.0;
    let mut count = 0usize;
    for frame in window.start_frame..end {
        match (shapes_a.get(&frame), shapes_b.get(&frame)) {
            (Some(sa), Some(sb)) if sa.outside == sb.outside => {
                error += 1.0 - geometry_similarity(sa, sb, window.dimension);
                count += 1;
            }
            (None, None) => {}
            _ => {
                error += 1.0;
                count += 1;
            }
        }
    }

    if count == 0 {
        return Ok(0.0);
    }
    Ok(1.0 - error / count as f64)
}

/// Joins two matched tracks. The track starting earlier keeps its identity
/// (`existing` on ties); keyframes are unioned by frame with `existing`
/// winning on shared frames.
fn unite_tracks(incoming: Track, existing: Track) -> Track {
    let frame = incoming.frame.min(existing.frame);
    let incoming_first = incoming.frame < existing.frame;

    let mut keyframes: BTreeMap<u64, Shape> =
        incoming.shapes.into_iter().map(|s| (s.frame, s)).collect();
    for shape in existing.shapes {
        keyframes.insert(shape.frame, shape);
    }

    let elements = unite_elements(incoming.elements, existing.elements);

    let mut track = if incoming_first {
        Track {
            shapes: Vec::new(),
            elements: Vec::new(),
            ..incoming
        }
    } else {
        Track {
            shapes: Vec::new(),
            elements: Vec::new(),
            ..existing
        }
    };
    track.frame = frame;
    track.shapes = keyframes.into_values().collect();
    track.elements = elements;
    track
}

/// Pairs skeleton element tracks by label and unites each pair. Elements
/// without a partner are kept as they are.
fn unite_elements(incoming: Vec<Track>, existing: Vec<Track>) -> Vec<Track> {
    let mut incoming: Vec<Option<Track>> = incoming.into_iter().map(Some).collect();

    let mut united: Vec<Track> = existing
        .into_iter()
        .map(|element| {
            let partner = incoming
                .iter_mut()
                .find(|slot| {
                    slot.as_ref()
                        .is_some_and(|other| other.label_id == element.label_id)
                })
                .and_then(Option::take);
            match partner {
                Some(other) => unite_tracks(other, element),
                None => element,
            }
        })
        .collect();

    united.extend(incoming.into_iter().flatten());
    united
}

/// Ends a visible track at `boundary` by appending an outside copy of its
/// last keyframe, then does the same for its elements.
fn close_out_track(track: &mut Track, boundary: u64) {
    let Some(last) = track.last_keyframe() else {
        return;
    };
    if last.outside || last.frame >= boundary {
        return;
    }

    let closing = Shape {
        id: None,
        frame: boundary,
        outside: true,
        ..last.clone()
    };
    track.shapes.push(closing);

    for element in &mut track.elements {
        close_out_track(element, boundary);
    }
}
