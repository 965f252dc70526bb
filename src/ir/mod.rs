//! Intermediate Representation (IR) for annotrack.
//!
//! This module defines the frame-indexed annotation container the engine
//! works on. A host loads the tags, shapes and tracks of one job segment into
//! an [`AnnotationIr`], then slices it to a frame range, merges a neighbouring
//! segment into it, or materializes a flat per-frame view of its tracks.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Use newtypes and marker types to prevent common errors
//!    at compile time (e.g., comparing a cuboid's top projection with its
//!    side projection, or mixing label and attribute ids).
//!
//! 2. **Owned Results**: Every operation consumes or borrows its input and
//!    returns a new, independent IR. Nothing is mutated behind the caller.
//!
//! 3. **Permissive Construction**: IR types allow "invalid" data to be
//!    represented (e.g., unordered keyframes or wrong point counts), so that
//!    validation can report issues rather than panic during parsing.
//!
//! # Example
//!
//! ```
//! use annotrack::ir::{AnnotationIr, Dimension, Shape, Track};
//!
//! let mut ir = AnnotationIr::new(Dimension::Dim2d);
//! ir.add_track(Track::new(
//!     1,
//!     1u64,
//!     vec![
//!         Shape::rectangle(0, 0.0, 0.0, 10.0, 10.0).with_keyframe(true),
//!         Shape::rectangle(10, 10.0, 0.0, 20.0, 10.0).with_keyframe(true),
//!     ],
//! ));
//!
//! let part = ir.slice(2, 5).unwrap();
//! assert_eq!(part.tracks[0].frame, 2);
//! ```

mod bbox;
mod convert;
mod coord;
mod ids;
pub mod io_json;
mod mask;
mod model;
mod slice;
mod space;

// Re-export core types for convenient access
pub use bbox::BBoxXYXY;
pub use convert::ShapeViewOptions;
pub use coord::Coord;
pub use ids::{AttributeSpecId, LabelId};
pub use mask::MaskRle;
pub use model::{AnnotationIr, Attribute, Dimension, Shape, ShapeType, Source, Tag, Track};
pub use space::{ImagePlane, SideView, TopView};
