//! Topology-preserving interpolation of polygons and polylines.
//!
//! The two keyframe curves usually have different vertex counts, so points
//! are paired by their relative position along the curve rather than by
//! index. Every left point is paired with the nearest right point by
//! arc-length offset, then each right point left unpaired is attached to its
//! nearest left point. The paired points are blended, and the oversampled
//! result is thinned back out segment by segment.

use crate::geometry::Point2;

/// Blends two curves at offset `t` in `[0, 1]`.
///
/// `closed` treats the curves as polygons: the first vertex is appended to
/// the end for the computation and removed from the result again.
pub fn interpolate_polyshape(left: &[f64], right: &[f64], t: f64, closed: bool) -> Vec<f64> {
    let mut left_points = Point2::from_flat(left);
    let mut right_points = Point2::from_flat(right);
    if left_points.is_empty() || right_points.is_empty() {
        return left.to_vec();
    }
    if closed {
        left_points.push(left_points[0]);
        right_points.push(right_points[0]);
    }

    let matching = match_curves(&offset_vector(&left_points), &offset_vector(&right_points));

    let right_ref = &right_points;
    let interpolated: Vec<Point2> = left_points
        .iter()
        .zip(&matching)
        .flat_map(|(left_point, matches)| {
            matches
                .iter()
                .map(move |&r| left_point.lerp(&right_ref[r], t))
        })
        .collect();

    let mut reduced = reduce(&interpolated, &matching, &left_points, &right_points);
    if closed {
        reduced.pop();
    }
    Point2::to_flat(&reduced)
}

fn curve_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Relative arc-length position of every vertex, from 0 to 1.
fn offset_vector(points: &[Point2]) -> Vec<f64> {
    let length = curve_length(points);
    if length == 0.0 {
        return vec![0.0; points.len()];
    }

    let mut offsets = Vec::with_capacity(points.len());
    let mut accumulated = 0.0;
    offsets.push(0.0);
    for pair in points.windows(2) {
        accumulated += pair[0].distance(&pair[1]);
        offsets.push(accumulated / length);
    }
    offsets
}

/// Index of the offset closest to `value`; the lowest index wins ties.
fn find_nearest(value: f64, curve: &[f64]) -> usize {
    let mut best = 0;
    let mut best_distance = (value - curve[0]).abs();
    for (i, offset) in curve.iter().enumerate().skip(1) {
        let distance = (value - offset).abs();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

/// For every left vertex, the sorted right vertices it is paired with.
fn match_curves(left: &[f64], right: &[f64]) -> Vec<Vec<usize>> {
    let mut matching: Vec<Vec<usize>> = left
        .iter()
        .map(|&offset| vec![find_nearest(offset, right)])
        .collect();

    let mut matched = vec![false; right.len()];
    for matches in &matching {
        matched[matches[0]] = true;
    }
    for (r, &offset) in right.iter().enumerate() {
        if !matched[r] {
            matching[find_nearest(offset, left)].push(r);
        }
    }

    for matches in &mut matching {
        matches.sort_unstable();
    }
    matching
}

fn average(points: &[Point2]) -> Point2 {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point2::new(sx / n, sy / n)
}

/// Thins `interpolated[start..=stop]`, dropping points closer than half the
/// average source spacing to the last kept point.
fn minimize_segment(
    interpolated: &[Point2],
    base_length: f64,
    source_points: usize,
    start: usize,
    stop: usize,
) -> Vec<Point2> {
    let threshold = base_length / (2.0 * source_points as f64);

    let mut minimized = vec![interpolated[start]];
    let mut latest = start;
    for i in (start + 1)..stop {
        if interpolated[latest].distance(&interpolated[i]) >= threshold {
            minimized.push(interpolated[i]);
            latest = i;
        }
    }
    minimized.push(interpolated[stop]);

    if minimized.len() == 2 && interpolated[start].distance(&interpolated[stop]) < threshold {
        return vec![average(&minimized)];
    }
    minimized
}

fn reduce(
    interpolated: &[Point2],
    matching: &[Vec<usize>],
    left_points: &[Point2],
    right_points: &[Point2],
) -> Vec<Point2> {
    let mut first_index = Vec::with_capacity(matching.len());
    let mut accumulated = 0;
    for matches in matching {
        first_index.push(accumulated);
        accumulated += matches.len();
    }

    // a run of left vertices that each map onto a single right vertex
    let left_segment = |start: usize, stop: usize, out: &mut Vec<Point2>| {
        let (from, to) = (first_index[start], first_index[stop]);
        if from == to {
            out.push(interpolated[from]);
            return;
        }
        let base_length = curve_length(&left_points[start..=stop]);
        out.extend(minimize_segment(
            interpolated,
            base_length,
            stop - start + 1,
            from,
            to,
        ));
    };

    // one left vertex fanned out onto several right vertices
    let right_segment = |left_point: usize, out: &mut Vec<Point2>| {
        let matches = &matching[left_point];
        let (start, stop) = (matches[0], matches[matches.len() - 1]);
        let from = first_index[left_point];
        let to = from + matches.len() - 1;
        let base_length = curve_length(&right_points[start..=stop]);
        out.extend(minimize_segment(
            interpolated,
            base_length,
            stop - start + 1,
            from,
            to,
        ));
    };

    let mut reduced = Vec::with_capacity(interpolated.len());
    let mut previous_opened: Option<usize> = None;
    for i in 0..left_points.len() {
        if matching[i].len() == 1 {
            match previous_opened {
                Some(opened) if matching[i][0] == matching[opened][0] => continue,
                Some(opened) => {
                    left_segment(opened, i, &mut reduced);
                    previous_opened = None;
                }
                None => previous_opened = Some(i),
            }
        } else {
            if let Some(opened) = previous_opened.take() {
                left_segment(opened, i - 1, &mut reduced);
            }
            right_segment(i, &mut reduced);
        }
    }
    if let Some(opened) = previous_opened {
        left_segment(opened, left_points.len() - 1, &mut reduced);
    }

    reduced
}
