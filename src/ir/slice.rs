//! Cutting an IR down to a frame range.

use super::model::{AnnotationIr, Dimension, Shape, Track};
use crate::error::AnnotrackError;
use crate::interpolation::{get_interpolated_shapes, InterpolationOptions};

impl AnnotationIr {
    /// Returns the part of the IR visible on frames `start..=stop`.
    ///
    /// Tags and shapes are kept if their frame is in range. A track is kept
    /// if it is visible anywhere in range; its keyframes are cut to the
    /// range, and shapes are synthesized at the edges where the cut would
    /// otherwise change what the track shows:
    ///
    /// - the interpolated shape on the first visible frame, if no keyframe
    ///   sits there
    /// - the interpolated shape on the last frame, if the track keeps moving
    ///   past `stop`
    /// - the outside shape that ends the track, if it lies just past the cut
    ///
    /// Slicing is idempotent.
    ///
    /// # Errors
    /// Fails if a track that has to be interpolated is malformed.
    #[tracing::instrument(skip(self))]
    pub fn slice(&self, start: u64, stop: u64) -> Result<AnnotationIr, AnnotrackError> {
        let in_range = |frame: u64| start <= frame && frame <= stop;

        let mut tracks = Vec::new();
        for track in &self.tracks {
            if !is_track_inside(track, start, stop) {
                continue;
            }
            let sliced = slice_track(track, start, stop, self.dimension)?;
            if !sliced.shapes.is_empty() {
                tracks.push(sliced);
            }
        }

        Ok(AnnotationIr {
            version: self.version,
            dimension: self.dimension,
            tags: self
                .tags
                .iter()
                .filter(|t| in_range(t.frame))
                .cloned()
                .collect(),
            shapes: self
                .shapes
                .iter()
                .filter(|s| in_range(s.frame))
                .cloned()
                .collect(),
            tracks,
        })
    }
}

/// True if the track is visible on at least one frame of `start..=stop`.
fn is_track_inside(track: &Track, start: u64, stop: u64) -> bool {
    let mut keyframes: Vec<&Shape> = track.shapes.iter().collect();
    keyframes.sort_by_key(|s| s.frame);

    let overlaps = |a: u64, b: u64| b.min(stop) >= a.max(start);
    let visible_span = keyframes
        .windows(2)
        .any(|pair| !pair[0].outside && overlaps(pair[0].frame, pair[1].frame));

    visible_span
        || keyframes
            .last()
            .is_some_and(|last| !last.outside && last.frame <= stop)
}

/// Keeps in-range shapes, minus any leading outside run.
fn scope_shapes<'a>(shapes: impl IntoIterator<Item = &'a Shape>, start: u64, stop: u64) -> Vec<Shape> {
    shapes
        .into_iter()
        .filter(|s| start <= s.frame && s.frame <= stop)
        .skip_while(|s| s.outside)
        .cloned()
        .collect()
}

fn synthesized(shape: &Shape) -> Shape {
    Shape {
        id: None,
        keyframe: false,
        ..shape.clone()
    }
}

fn slice_track(
    track: &Track,
    start: u64,
    stop: u64,
    dimension: Dimension,
) -> Result<Track, AnnotrackError> {
    let mut sliced = track.clone();
    sliced.elements = track
        .elements
        .iter()
        .map(|element| slice_track(element, start, stop, dimension))
        .collect::<Result<_, _>>()?;

    let mut segment = scope_shapes(&track.shapes, start, stop);
    if segment.len() < track.shapes.len() {
        // one frame past the cut, to see whether the track ends right there
        let after_stop = stop.saturating_add(1);
        let interpolated = get_interpolated_shapes(
            track,
            start,
            after_stop.saturating_add(1),
            dimension,
            &InterpolationOptions::default(),
        )?;
        let scoped = scope_shapes(&interpolated, start, stop);

        if let (Some(first), Some(last)) = (scoped.first(), scoped.last()) {
            if !first.keyframe {
                // outside keyframes after the synthesized start are no longer leading
                segment = std::iter::once(synthesized(first))
                    .chain(
                        track
                            .shapes
                            .iter()
                            .filter(|s| first.frame < s.frame && s.frame <= stop)
                            .cloned(),
                    )
                    .collect();
            }

            let last_key = track.last_keyframe().map_or(0, |s| s.frame);
            let segment_last = segment.last();

            if last_key >= stop && segment_last.is_some_and(|s| s.points != last.points) {
                segment.push(synthesized(last));
            } else if last.keyframe
                && last.outside
                && segment_last.is_some_and(|s| last.frame > s.frame)
            {
                segment.push(synthesized(last));
            } else if let Some(ending) = interpolated
                .iter()
                .find(|s| s.frame == after_stop && s.outside)
            {
                segment.push(synthesized(ending));
            }
        }

        for shape in &mut segment {
            shape.id = None;
        }
        sliced.shapes = segment;
    }

    if let Some(first) = sliced.shapes.first() {
        sliced.frame = first.frame;
    }
    Ok(sliced)
}
