//! Flat views: tracks as per-frame shapes, and shapes as tracks.

use std::collections::{BTreeMap, BTreeSet};

use super::model::{AnnotationIr, Dimension, Shape, Track};
use crate::error::AnnotrackError;
use crate::interpolation::{get_interpolated_shapes, InterpolationOptions};

/// Options for [`AnnotationIr::to_shapes`].
#[derive(Clone, Debug, Default)]
pub struct ShapeViewOptions {
    /// Frames at or after this one are not materialized.
    pub end_frame: u64,

    /// If set, only shapes on these frames are returned.
    pub included_frames: Option<BTreeSet<u64>>,

    /// Also return the outside shapes between an outside keyframe and the
    /// next keyframe.
    pub include_outside: bool,

    /// Stamp shapes with the track's server id instead of its position.
    pub use_server_track_ids: bool,

    /// Frames removed from the timeline; keyframes on them are ignored.
    pub deleted_frames: Option<BTreeSet<u64>>,
}

impl AnnotationIr {
    /// Materializes every track into per-frame shapes.
    ///
    /// Returns the standalone shapes (on included frames) followed by the
    /// shapes of each track over `[0, end_frame)`. Track shapes take the
    /// track's label, group and source, have the track's attributes
    /// appended, and carry a `track_id`. Skeleton element shapes are nested
    /// under the parent shape of the same frame.
    ///
    /// # Errors
    /// Fails if a track cannot be interpolated.
    #[tracing::instrument(skip_all, fields(end_frame = options.end_frame))]
    pub fn to_shapes(&self, options: &ShapeViewOptions) -> Result<Vec<Shape>, AnnotrackError> {
        let mut shapes: Vec<Shape> = self
            .shapes
            .iter()
            .filter(|s| {
                options
                    .included_frames
                    .as_ref()
                    .map_or(true, |set| set.contains(&s.frame))
            })
            .cloned()
            .collect();

        let interpolation = InterpolationOptions {
            included_frames: options.included_frames.as_ref(),
            include_outside: options.include_outside,
            deleted_frames: options.deleted_frames.as_ref(),
        };
        shapes.extend(tracks_to_shapes(
            &self.tracks,
            self.dimension,
            options.end_frame,
            &interpolation,
            options.use_server_track_ids,
        )?);

        Ok(shapes)
    }

    /// Returns all tracks, with every standalone shape turned into a track
    /// that shows it on its frame and ends on the next one.
    pub fn to_tracks(&self) -> Vec<Track> {
        let mut tracks = self.tracks.clone();
        tracks.extend(self.shapes.iter().map(shape_to_track));
        tracks
    }
}

fn tracks_to_shapes(
    tracks: &[Track],
    dimension: Dimension,
    end_frame: u64,
    options: &InterpolationOptions<'_>,
    use_server_track_ids: bool,
) -> Result<Vec<Shape>, AnnotrackError> {
    let mut shapes = Vec::new();

    for (index, track) in tracks.iter().enumerate() {
        let track_id = if use_server_track_ids {
            track.id
        } else {
            index as u64
        };

        let mut by_frame: BTreeMap<u64, Shape> = BTreeMap::new();
        for mut shape in get_interpolated_shapes(track, 0, end_frame, dimension, options)? {
            shape.label_id = track.label_id;
            shape.group = track.group;
            shape.source = track.source;
            shape.track_id = Some(track_id);
            shape.attributes.extend(track.attributes.iter().cloned());
            shape.elements = Vec::new();
            by_frame.insert(shape.frame, shape);
        }
        if by_frame.is_empty() {
            continue;
        }

        if !track.elements.is_empty() {
            // elements are sampled where the parent is, outside or not
            let parent_frames: BTreeSet<u64> = by_frame.keys().copied().collect();
            let element_options = InterpolationOptions {
                included_frames: Some(&parent_frames),
                include_outside: true,
                deleted_frames: options.deleted_frames,
            };
            let element_shapes = tracks_to_shapes(
                &track.elements,
                dimension,
                end_frame,
                &element_options,
                use_server_track_ids,
            )?;
            for element in element_shapes {
                if let Some(parent) = by_frame.get_mut(&element.frame) {
                    parent.elements.push(element);
                }
            }

            if !options.include_outside {
                by_frame.retain(|_, shape| {
                    shape.elements.is_empty() || !shape.elements.iter().all(|e| e.outside)
                });
            }
        }

        shapes.extend(by_frame.into_values());
    }

    Ok(shapes)
}

fn shape_to_track(shape: &Shape) -> Track {
    let visible = Shape {
        id: None,
        keyframe: true,
        outside: false,
        group: None,
        attributes: Vec::new(),
        elements: Vec::new(),
        track_id: None,
        ..shape.clone()
    };
    let hidden = Shape {
        frame: shape.frame.saturating_add(1),
        outside: true,
        ..visible.clone()
    };

    Track {
        id: 0,
        label_id: shape.label_id,
        group: shape.group,
        frame: shape.frame,
        source: shape.source,
        attributes: shape.attributes.clone(),
        shapes: vec![visible, hidden],
        elements: shape.elements.iter().map(shape_to_track).collect(),
    }
}
