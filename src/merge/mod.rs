//! Merging annotations of overlapping job segments.
//!
//! Two annotation jobs over adjacent frame ranges share an overlap window.
//! Objects the second job drew inside that window are matched against what
//! the first job already holds there; matched pairs are united, and
//! everything else is carried over. The same algorithm serves tags, shapes
//! and tracks through the [`ObjectKind`] trait:
//!
//! 1. Incoming objects starting at or after the end of the window are
//!    appended as they are.
//! 2. The remaining candidates of both sides are grouped by frame (tracks
//!    all share one group), and each group is solved as a minimum-cost
//!    assignment with cost `1 - similarity`.
//! 3. Pairs whose cost is within the kind's threshold are united in place.
//!    Unmatched incoming objects are appended; unmatched existing objects
//!    are closed out at the end of the window.

mod assignment;
mod shape;
mod tag;
mod track;

pub use assignment::{assign, Assignment};
pub use shape::ShapeKind;
pub use tag::TagKind;
pub use track::{track_similarity, TrackKind};

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::AnnotrackError;
use crate::ir::{AnnotationIr, Dimension};

/// Where the incoming segment overlaps the existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeWindow {
    /// First frame of the incoming segment.
    pub start_frame: u64,
    /// Number of frames both segments cover.
    pub overlap: u64,
    pub dimension: Dimension,
}

impl MergeWindow {
    pub fn new(start_frame: u64, overlap: u64, dimension: Dimension) -> Self {
        Self {
            start_frame,
            overlap,
            dimension,
        }
    }

    /// First frame after the overlap window.
    pub fn end(&self) -> u64 {
        self.start_frame.saturating_add(self.overlap)
    }
}

/// The per-kind policies of the merge algorithm.
pub trait ObjectKind {
    type Object;

    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Largest cost at which a pair is still accepted as a match.
    fn cost_threshold(&self) -> f64;

    /// The frame an object starts on.
    fn frame(&self, object: &Self::Object) -> u64;

    /// Group key of an existing object, or `None` if it cannot be matched.
    fn existing_group(&self, object: &Self::Object, window: &MergeWindow) -> Option<u64>;

    /// Group key of an incoming object inside the window, or `None` if it
    /// cannot be matched.
    fn incoming_group(&self, object: &Self::Object, window: &MergeWindow) -> Option<u64>;

    /// Similarity in `[0, 1]`.
    fn similarity(
        &self,
        a: &Self::Object,
        b: &Self::Object,
        window: &MergeWindow,
    ) -> Result<f64, AnnotrackError>;

    /// Replaces `existing` with the union of a matched pair.
    fn unite(&self, incoming: Self::Object, existing: &mut Self::Object);

    /// Adjusts an existing object that found no partner.
    fn close_out(&self, object: &mut Self::Object, boundary: u64);
}

/// Merges `incoming` into `existing` and returns the combined list.
///
/// The result holds the (possibly united or closed out) existing objects in
/// their original order, then the incoming objects past the window, then the
/// incoming objects that found no partner.
pub fn merge_objects<K: ObjectKind>(
    kind: &K,
    existing: Vec<K::Object>,
    incoming: Vec<K::Object>,
    window: &MergeWindow,
) -> Result<Vec<K::Object>, AnnotrackError> {
    let boundary = window.end();
    let (new_objects, int_objects): (Vec<_>, Vec<_>) = incoming
        .into_iter()
        .partition(|object| kind.frame(object) >= boundary);

    let mut output = existing;

    let mut existing_by_frame: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (idx, object) in output.iter().enumerate() {
        if let Some(frame) = kind.existing_group(object, window) {
            existing_by_frame.entry(frame).or_default().push(idx);
        }
    }

    let mut unmatched = Vec::new();
    let mut int_by_frame: BTreeMap<u64, Vec<K::Object>> = BTreeMap::new();
    for object in int_objects {
        match kind.incoming_group(&object, window) {
            Some(frame) => int_by_frame.entry(frame).or_default().push(object),
            None => unmatched.push(object),
        }
    }

    if existing_by_frame.is_empty() || int_by_frame.is_empty() {
        for &idx in existing_by_frame.values().flatten() {
            kind.close_out(&mut output[idx], boundary);
        }
        unmatched.extend(int_by_frame.into_values().flatten());
    } else {
        for (frame, group) in int_by_frame {
            let Some(existing_idx) = existing_by_frame.get(&frame) else {
                unmatched.extend(group);
                continue;
            };

            let costs = group
                .iter()
                .map(|int_object| {
                    existing_idx
                        .iter()
                        .map(|&idx| Ok(1.0 - kind.similarity(int_object, &output[idx], window)?))
                        .collect::<Result<Vec<f64>, AnnotrackError>>()
                })
                .collect::<Result<Vec<_>, _>>()?;

            let result = assign(&costs, kind.cost_threshold())?;
            debug!(
                kind = kind.name(),
                frame,
                candidates = group.len(),
                existing = existing_idx.len(),
                matched = result.matches.len(),
                "solved assignment"
            );

            let mut slots: Vec<Option<K::Object>> = group.into_iter().map(Some).collect();
            for &(i, j) in &result.matches {
                if let Some(int_object) = slots[i].take() {
                    debug!(kind = kind.name(), frame, cost = costs[i][j], "uniting matched pair");
                    kind.unite(int_object, &mut output[existing_idx[j]]);
                }
            }
            unmatched.extend(slots.into_iter().flatten());

            for &j in &result.unmatched_cols {
                kind.close_out(&mut output[existing_idx[j]], boundary);
            }
        }
    }

    output.extend(new_objects);
    output.extend(unmatched);
    Ok(output)
}

impl AnnotationIr {
    /// Merges the annotations of the next job segment into this one.
    ///
    /// `start_frame` is the first frame of `incoming`, and `overlap` the
    /// number of frames both segments cover.
    ///
    /// # Errors
    /// Fails if the two IRs have different dimensions, or a track involved
    /// in matching cannot be interpolated.
    #[tracing::instrument(skip(self, incoming))]
    pub fn merge(
        self,
        incoming: AnnotationIr,
        start_frame: u64,
        overlap: u64,
    ) -> Result<AnnotationIr, AnnotrackError> {
        if self.dimension != incoming.dimension {
            return Err(AnnotrackError::DimensionMismatch {
                left: self.dimension,
                right: incoming.dimension,
            });
        }

        let window = MergeWindow::new(start_frame, overlap, self.dimension);
        Ok(AnnotationIr {
            version: self.version,
            dimension: self.dimension,
            tags: merge_objects(&TagKind, self.tags, incoming.tags, &window)?,
            shapes: merge_objects(&ShapeKind, self.shapes, incoming.shapes, &window)?,
            tracks: merge_objects(&TrackKind, self.tracks, incoming.tracks, &window)?,
        })
    }
}
