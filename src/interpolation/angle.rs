//! Shortest-arc angle interpolation.

use std::f64::consts::{PI, TAU};

/// Signed difference `to - from` in degrees, wrapped to `[-180, 180)`.
///
/// An exact half-turn resolves to `-180`.
#[inline]
pub fn shortest_arc(from_deg: f64, to_deg: f64) -> f64 {
    (to_deg - from_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Blends two rotations in degrees along the shortest arc. The result lies
/// in `[0, 360)`.
pub fn interpolate_rotation(from_deg: f64, to_deg: f64, t: f64) -> f64 {
    (from_deg + shortest_arc(from_deg, to_deg) * t + 360.0).rem_euclid(360.0)
}

/// Blends two Euler angles in radians along the shortest arc. The result
/// lies in `(-π, π]`.
pub fn interpolate_euler(from_rad: f64, to_rad: f64, t: f64) -> f64 {
    let from_deg = positive_radians(from_rad).to_degrees();
    let to_deg = positive_radians(to_rad).to_degrees();

    let blended = (from_deg + shortest_arc(from_deg, to_deg) * t).to_radians();
    if blended > PI {
        blended - TAU
    } else if blended <= -PI {
        blended + TAU
    } else {
        blended
    }
}

#[inline]
fn positive_radians(angle: f64) -> f64 {
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}
