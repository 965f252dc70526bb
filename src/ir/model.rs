//! Core record model for the annotation intermediate representation.
//!
//! These are the records exchanged with the host system: tags (frame-level
//! labels), shapes (geometry on a single frame) and tracks (keyframed
//! shapes following one object across frames). Everything the engine does
//! reads and produces these types.

use serde::{Deserialize, Serialize};

use super::ids::{AttributeSpecId, LabelId};

/// The geometric kind of a shape.
///
/// The point encoding of a shape depends on its type; see [`Shape::points`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rectangle,
    Ellipse,
    Polygon,
    Polyline,
    Points,
    Cuboid,
    Skeleton,
    Mask,
}

impl ShapeType {
    /// The literal name used in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Ellipse => "ellipse",
            ShapeType::Polygon => "polygon",
            ShapeType::Polyline => "polyline",
            ShapeType::Points => "points",
            ShapeType::Cuboid => "cuboid",
            ShapeType::Skeleton => "skeleton",
            ShapeType::Mask => "mask",
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the annotated media is a 2D video or a 3D point-cloud sequence.
///
/// The dimension changes the interpolation of angle-bearing shapes and
/// enables cuboid similarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[default]
    #[serde(rename = "2d")]
    Dim2d,
    #[serde(rename = "3d")]
    Dim3d,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Dim2d => f.write_str("2d"),
            Dimension::Dim3d => f.write_str("3d"),
        }
    }
}

/// Where an annotation came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    #[default]
    Manual,
    Auto,
    SemiAuto,
    File,
    Consensus,
}

/// A single attribute value attached to an annotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute specification this value belongs to.
    pub spec_id: AttributeSpecId,

    /// The value, as entered by the annotator.
    pub value: String,
}

impl Attribute {
    /// Creates a new attribute value.
    pub fn new(spec_id: impl Into<AttributeSpecId>, value: impl Into<String>) -> Self {
        Self {
            spec_id: spec_id.into(),
            value: value.into(),
        }
    }
}

/// A frame-level label without geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Server-side identifier, if the tag has been stored before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Frame the tag is attached to.
    pub frame: u64,

    /// Label of the tag.
    pub label_id: LabelId,

    /// Optional group the tag belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u64>,

    /// Provenance of the tag.
    #[serde(default)]
    pub source: Source,

    /// Attribute values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl Tag {
    /// Creates a new tag on the given frame.
    pub fn new(frame: u64, label_id: impl Into<LabelId>) -> Self {
        Self {
            id: None,
            frame,
            label_id: label_id.into(),
            group: None,
            source: Source::default(),
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute to the tag.
    pub fn with_attribute(
        mut self,
        spec_id: impl Into<AttributeSpecId>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute::new(spec_id, value));
        self
    }
}

/// Geometry of one object on one frame.
///
/// Standalone shapes and the keyframes of a track share this type. Inside a
/// track, `label_id`, `group` and `source` are carried by the track and are
/// filled in when shapes are materialized with
/// [`AnnotationIr::to_shapes`](super::AnnotationIr::to_shapes).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Server-side identifier, if the shape has been stored before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Geometric kind.
    #[serde(rename = "type")]
    pub shape_type: ShapeType,

    /// Frame the shape is drawn on.
    pub frame: u64,

    /// Flat coordinate list, encoded per shape type:
    /// - rectangle, ellipse: `[x1, y1, x2, y2]`
    /// - polygon, polyline, points: `[x0, y0, x1, y1, ...]`
    /// - cuboid: 16 values; in 3D `[cx, cy, cz, rx, ry, rz, sx, sy, sz, ...]`
    ///   with angles in radians
    /// - mask: run lengths followed by `[left, top, right, bottom]`
    /// - skeleton: usually empty, geometry lives in `elements`
    #[serde(default)]
    pub points: Vec<f64>,

    /// Clockwise rotation in degrees around the shape center.
    #[serde(default)]
    pub rotation: f64,

    /// The object is visible but covered by something else.
    #[serde(default)]
    pub occluded: bool,

    /// The object is not present on this frame.
    #[serde(default)]
    pub outside: bool,

    /// The shape was authored rather than synthesized by interpolation.
    #[serde(default)]
    pub keyframe: bool,

    /// Drawing order.
    #[serde(default)]
    pub z_order: i32,

    /// Label of the shape.
    #[serde(default)]
    pub label_id: LabelId,

    /// Optional group the shape belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u64>,

    /// Provenance of the shape.
    #[serde(default)]
    pub source: Source,

    /// Attribute values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,

    /// Skeleton sub-parts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Shape>,

    /// Track this shape was materialized from, set by flat shape views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,
}

impl Shape {
    /// Creates a visible shape with the given geometry.
    pub fn new(shape_type: ShapeType, frame: u64, points: Vec<f64>) -> Self {
        Self {
            id: None,
            shape_type,
            frame,
            points,
            rotation: 0.0,
            occluded: false,
            outside: false,
            keyframe: false,
            z_order: 0,
            label_id: LabelId::default(),
            group: None,
            source: Source::default(),
            attributes: Vec::new(),
            elements: Vec::new(),
            track_id: None,
        }
    }

    /// Creates a rectangle from two corners.
    pub fn rectangle(frame: u64, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(ShapeType::Rectangle, frame, vec![x1, y1, x2, y2])
    }

    /// Creates a polygon from a flat `[x0, y0, x1, y1, ...]` list.
    pub fn polygon(frame: u64, points: Vec<f64>) -> Self {
        Self::new(ShapeType::Polygon, frame, points)
    }

    /// Sets the label.
    pub fn with_label(mut self, label_id: impl Into<LabelId>) -> Self {
        self.label_id = label_id.into();
        self
    }

    /// Sets the outside flag.
    pub fn with_outside(mut self, outside: bool) -> Self {
        self.outside = outside;
        self
    }

    /// Sets the keyframe flag.
    pub fn with_keyframe(mut self, keyframe: bool) -> Self {
        self.keyframe = keyframe;
        self
    }

    /// Sets the rotation in degrees.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Adds an attribute.
    pub fn with_attribute(
        mut self,
        spec_id: impl Into<AttributeSpecId>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute::new(spec_id, value));
        self
    }

    /// Sets the skeleton sub-parts.
    pub fn with_elements(mut self, elements: Vec<Shape>) -> Self {
        self.elements = elements;
        self
    }
}

/// One object followed across frames through a sorted list of keyframes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Server-side identifier; used in diagnostics.
    #[serde(default)]
    pub id: u64,

    /// Label of the tracked object.
    pub label_id: LabelId,

    /// Optional group the track belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u64>,

    /// Frame of the first keyframe.
    pub frame: u64,

    /// Provenance of the track.
    #[serde(default)]
    pub source: Source,

    /// Attribute values that do not change over time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,

    /// Keyframes, strictly increasing by frame.
    pub shapes: Vec<Shape>,

    /// Skeleton sub-part tracks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Track>,
}

impl Track {
    /// Creates a track from its keyframes. The track frame is the earliest
    /// keyframe frame.
    pub fn new(id: u64, label_id: impl Into<LabelId>, shapes: Vec<Shape>) -> Self {
        let frame = shapes.iter().map(|s| s.frame).min().unwrap_or(0);
        Self {
            id,
            label_id: label_id.into(),
            group: None,
            frame,
            source: Source::default(),
            attributes: Vec::new(),
            shapes,
            elements: Vec::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(
        mut self,
        spec_id: impl Into<AttributeSpecId>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute::new(spec_id, value));
        self
    }

    /// Sets the skeleton sub-part tracks.
    pub fn with_elements(mut self, elements: Vec<Track>) -> Self {
        self.elements = elements;
        self
    }

    /// Returns the keyframe with the highest frame.
    pub fn last_keyframe(&self) -> Option<&Shape> {
        self.shapes.iter().max_by_key(|s| s.frame)
    }
}

/// The frame-indexed annotation container of one job segment.
///
/// Think of it as the working set the engine operates on: a host loads the
/// records of a segment into an IR, then slices it, merges another segment
/// into it, or materializes a flat per-frame view from it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationIr {
    /// Revision counter of the annotation set.
    #[serde(default)]
    pub version: u64,

    /// Dimension of the annotated media.
    #[serde(default)]
    pub dimension: Dimension,

    /// Frame-level tags.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Standalone shapes.
    #[serde(default)]
    pub shapes: Vec<Shape>,

    /// Tracks.
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl AnnotationIr {
    /// Creates an empty IR for media of the given dimension.
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            ..Default::default()
        }
    }

    /// Appends a tag.
    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Appends a standalone shape.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Appends a track.
    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Returns true if the IR holds no tags, shapes or tracks.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.shapes.is_empty() && self.tracks.is_empty()
    }
}
