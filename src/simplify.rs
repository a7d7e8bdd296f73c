//! Boundary simplification at stitch resolution.
//!
//! Two reducers run after scaling: Ramer-Douglas-Peucker with a
//! perimeter-derived tolerance, and a spacing pass that thins outline
//! paths to a minimum stitch length.

use crate::error::{StitchError, StitchResult};
use crate::geometry::{Point, Polygon};

/// Reduce a closed polygon with Ramer-Douglas-Peucker at `epsilon`.
///
/// The ring is opened at its first vertex and the chord endpoints are
/// pinned, so the first vertex always survives and the vertex count
/// never grows. Results with fewer than 3 vertices are rejected.
pub fn simplify_polygon(polygon: &Polygon, epsilon: f32) -> StitchResult<Polygon> {
    let mut ring: Vec<Point> = polygon.points().to_vec();
    ring.push(ring[0]);

    let mut reduced = rdp(&ring, epsilon);
    if reduced.len() > 1 && reduced.first() == reduced.last() {
        reduced.pop();
    }
    if reduced.len() < 3 {
        return Err(StitchError::InvalidPolygon { got: reduced.len() });
    }
    Polygon::new(reduced)
}

/// Thin an ordered stitch path to a minimum inter-point spacing.
///
/// The first point is always kept; each later point survives only if it
/// lies at least `min_spacing` from the last kept point. Keeping a point
/// never moves it, so a path that already satisfies the spacing comes
/// back unchanged. Fewer than 2 survivors is rejected.
pub fn simplify_spacing(points: &[Point], min_spacing: f32) -> StitchResult<Vec<Point>> {
    let Some(&first) = points.first() else {
        return Err(StitchError::PathTooShort);
    };
    let mut kept = vec![first];
    let mut last = first;
    for &point in &points[1..] {
        if last.distance(point) >= min_spacing {
            kept.push(point);
            last = point;
        }
    }
    if kept.len() < 2 {
        return Err(StitchError::PathTooShort);
    }
    Ok(kept)
}

fn rdp(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let mut max_dist = 0.0;
    let mut index = 0usize;

    for (i, point) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            index = i;
            max_dist = dist;
        }
    }

    if max_dist > epsilon {
        let mut left = rdp(&points[..=index], epsilon);
        let right = rdp(&points[index..], epsilon);
        left.pop();
        left.into_iter().chain(right).collect()
    } else {
        vec![first, last]
    }
}

fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f32 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
        return point.distance(line_start);
    }

    let numerator = (dy * point.x - dx * point.y + line_end.x * line_start.y
        - line_end.y * line_start.x)
        .abs();
    numerator / (dx * dx + dy * dy).sqrt()
}
