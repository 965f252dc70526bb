//! Polygon regions built from flat point lists.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BooleanOps, Coord, Line, LineString, Polygon};

/// Builds a simple polygon from `[x0, y0, x1, y1, ...]`.
///
/// Returns `None` when the ring is not a valid plane region: fewer than
/// three distinct vertices, non-finite coordinates, or edges that cross or
/// fold back onto each other. Repeated consecutive vertices and an explicit
/// closing vertex are tolerated.
pub fn simple_polygon(points: &[f64]) -> Option<Polygon<f64>> {
    if points.len() % 2 != 0 || points.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut ring: Vec<Coord<f64>> = Vec::with_capacity(points.len() / 2);
    for pair in points.chunks_exact(2) {
        let coord = Coord {
            x: pair[0],
            y: pair[1],
        };
        if ring.last() != Some(&coord) {
            ring.push(coord);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 || has_self_intersection(&ring) {
        return None;
    }

    Some(Polygon::new(LineString::from(ring), vec![]))
}

fn has_self_intersection(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(ring[i], ring[(i + 1) % n]))
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return true,
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { .. }) => return true,
            }
        }
    }
    false
}

/// Intersection over union of two polygon regions.
///
/// Invalid or zero-area polygons (a line drawn with many points) have no
/// region to compare and score zero.
pub fn polygon_iou(a: &[f64], b: &[f64]) -> f64 {
    let (Some(poly_a), Some(poly_b)) = (simple_polygon(a), simple_polygon(b)) else {
        return 0.0;
    };

    let area_a = poly_a.unsigned_area();
    let area_b = poly_b.unsigned_area();
    if area_a == 0.0 || area_b == 0.0 {
        return 0.0;
    }

    let inter = poly_a.intersection(&poly_b).unsigned_area();
    let iou = inter / (area_a + area_b - inter);
    if iou.is_finite() {
        iou.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [f64; 8] = [0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];

    #[test]
    fn test_identical_polygons() {
        assert!((polygon_iou(&SQUARE, &SQUARE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_half_overlap() {
        let shifted = [5.0, 0.0, 15.0, 0.0, 15.0, 10.0, 5.0, 10.0];
        // intersection 50, union 150
        assert!((polygon_iou(&SQUARE, &shifted) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_polygons() {
        let far = [20.0, 20.0, 30.0, 20.0, 30.0, 30.0];
        assert_eq!(polygon_iou(&SQUARE, &far), 0.0);
    }

    #[test]
    fn test_bowtie_is_invalid() {
        let bowtie = [0.0, 0.0, 10.0, 10.0, 10.0, 0.0, 0.0, 10.0];
        assert!(simple_polygon(&bowtie).is_none());
        assert_eq!(polygon_iou(&SQUARE, &bowtie), 0.0);
    }

    #[test]
    fn test_flat_polygon_scores_zero() {
        let line = [0.0, 0.0, 5.0, 0.0, 10.0, 0.0];
        assert_eq!(polygon_iou(&SQUARE, &line), 0.0);
    }

    #[test]
    fn test_closing_and_repeated_vertices_tolerated() {
        let closed = [
            0.0, 0.0, 10.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0, 0.0, 0.0,
        ];
        assert!(simple_polygon(&closed).is_some());
        assert!((polygon_iou(&SQUARE, &closed) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_vertices() {
        assert!(simple_polygon(&[0.0, 0.0, 1.0, 1.0]).is_none());
        assert!(simple_polygon(&[0.0, 0.0, 1.0]).is_none());
    }
}
