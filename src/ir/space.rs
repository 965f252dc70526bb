//! Projection plane marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between the planes a box can live in at compile time. 2D shapes are drawn
//! on the image plane; 3D cuboids are compared through two orthogonal
//! projections, and the markers keep a top-down box from ever being compared
//! with a side box.

use std::fmt;

/// Marker type for the image plane (x to the right, y down).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImagePlane {}

/// Marker type for the top-down projection of a 3D scene (x/y).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopView {}

/// Marker type for the side projection of a 3D scene (x/z).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideView {}

impl fmt::Debug for ImagePlane {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for TopView {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for SideView {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
