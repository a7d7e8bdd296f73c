//! Planar geometry primitives shared by the extraction, simplification
//! and fill stages.

use serde::{Deserialize, Serialize};

use crate::error::{StitchError, StitchResult};

/// A 2D point, in pixel coordinates or output units depending on stage.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned bounding box of a point set.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// A closed polygon: at least 3 vertices, the last implicitly connected
/// back to the first, with no consecutive duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Build a polygon from a vertex loop.
    ///
    /// Consecutive duplicate vertices are collapsed, including a trailing
    /// repeat of the first vertex. Fewer than 3 survivors is rejected.
    pub fn new(points: Vec<Point>) -> StitchResult<Polygon> {
        let mut cleaned: Vec<Point> = Vec::with_capacity(points.len());
        for point in points {
            if cleaned.last() != Some(&point) {
                cleaned.push(point);
            }
        }
        if cleaned.len() > 1 && cleaned.first() == cleaned.last() {
            cleaned.pop();
        }
        if cleaned.len() < 3 {
            return Err(StitchError::InvalidPolygon { got: cleaned.len() });
        }
        Ok(Polygon { points: cleaned })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Total length of the closed loop, wrap-around edge included.
    pub fn perimeter(&self) -> f32 {
        let mut total = 0.0;
        for i in 0..self.points.len() {
            let next = self.points[(i + 1) % self.points.len()];
            total += self.points[i].distance(next);
        }
        total
    }

    /// Signed area via the shoelace formula. Negative for clockwise
    /// winding in a y-down image frame.
    pub fn signed_area(&self) -> f32 {
        let mut area = 0.0;
        for i in 0..self.points.len() {
            let a = self.points[i];
            let b = self.points[(i + 1) % self.points.len()];
            area += a.x * b.y - b.x * a.y;
        }
        area / 2.0
    }

    /// Bounding box of the vertices.
    pub fn bounds(&self) -> Bounds {
        let first = self.points[0];
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for point in &self.points[1..] {
            bounds.min_x = bounds.min_x.min(point.x);
            bounds.min_y = bounds.min_y.min(point.y);
            bounds.max_x = bounds.max_x.max(point.x);
            bounds.max_y = bounds.max_y.max(point.y);
        }
        bounds
    }
}
