//! Scan-line fill: horizontal stitch spans covering a polygon interior
//! under the even-odd rule.

use std::cmp::Ordering;

use crate::config::COORD_EPS;
use crate::error::{StitchError, StitchResult};
use crate::geometry::{Point, Polygon};

/// One horizontal fill span, stitched start to end after a jump.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FillSegment {
    pub start: Point,
    pub end: Point,
}

/// Number of scan rows laid over a shape of the given bounding-box
/// height: one row every `spacing` units starting at the top edge, plus
/// the starting row itself.
pub fn scan_row_count(height: f32, spacing: f32) -> usize {
    (height / spacing.max(COORD_EPS)).ceil() as usize + 1
}

/// Cover the polygon interior with horizontal spans.
///
/// Rows sit at `min_y + i * row_spacing`; each row collects its edge
/// intersections, sorts them by x and pairs them off in order under the
/// even-odd rule. An unpaired trailing intersection is dropped. Rows are
/// emitted in increasing y, spans within a row in increasing x, so the
/// output order is fully determined by the polygon.
///
/// Self-intersecting boundaries are legal input; the even-odd pairing
/// resolves them without any winding bookkeeping. Returns
/// [`StitchError::DegenerateFill`] when no row yields a span.
pub fn fill_polygon(polygon: &Polygon, row_spacing: f32) -> StitchResult<Vec<FillSegment>> {
    let spacing = row_spacing.max(COORD_EPS);
    let bounds = polygon.bounds();
    let rows = scan_row_count(bounds.height(), spacing);

    let mut segments = Vec::new();
    for row in 0..rows {
        let y = bounds.min_y + row as f32 * spacing;
        let mut intersections = row_intersections(polygon, y);
        intersections.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        for pair in intersections.chunks_exact(2) {
            segments.push(FillSegment {
                start: Point::new(pair[0], y),
                end: Point::new(pair[1], y),
            });
        }
    }

    if segments.is_empty() {
        return Err(StitchError::DegenerateFill);
    }
    Ok(segments)
}

/// X coordinates where the scan row at `y` meets the polygon's edges.
fn row_intersections(polygon: &Polygon, y: f32) -> Vec<f32> {
    let points = polygon.points();
    let mut xs = Vec::new();

    for i in 0..points.len() {
        let p1 = points[i];
        let p2 = points[(i + 1) % points.len()];

        // Near-horizontal edges have no single crossing; the even-odd
        // rule leaves them to the adjoining edges.
        if (p2.y - p1.y).abs() <= COORD_EPS {
            continue;
        }
        if !straddles(p1.y, p2.y, y) {
            continue;
        }
        xs.push(p1.x + (y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y));
    }
    xs
}

/// Inclusive straddle-or-touch test under the crate epsilon. A row that
/// lands exactly on a vertex still counts against both incident edges.
fn straddles(a: f32, b: f32, y: f32) -> bool {
    a.min(b) - COORD_EPS <= y && y <= a.max(b) + COORD_EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(points: &[(f32, f32)]) -> Polygon {
        Polygon::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
            .expect("valid polygon")
    }

    #[test]
    fn test_scan_row_count() {
        assert_eq!(scan_row_count(3.0, 1.0), 4);
        assert_eq!(scan_row_count(2.5, 1.0), 4);
        assert_eq!(scan_row_count(3.5, 2.0), 3);
        assert_eq!(scan_row_count(0.0, 1.0), 1);
    }

    #[test]
    fn test_square_fills_every_row() {
        let square = polygon(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]);
        let segments = fill_polygon(&square, 1.0).expect("square has interior");

        assert_eq!(segments.len(), 4);
        for (row, segment) in segments.iter().enumerate() {
            assert_eq!(segment.start, Point::new(0.0, row as f32));
            assert_eq!(segment.end, Point::new(3.0, row as f32));
        }
    }

    #[test]
    fn test_rows_ascend_and_spans_ascend_within_rows() {
        let square = polygon(&[(0.0, 0.0), (8.0, 0.0), (8.0, 6.0), (0.0, 6.0)]);
        let segments = fill_polygon(&square, 1.5).expect("square has interior");

        for pair in segments.windows(2) {
            let same_row = (pair[1].start.y - pair[0].start.y).abs() <= COORD_EPS;
            if same_row {
                assert!(pair[0].end.x <= pair[1].start.x);
            } else {
                assert!(pair[0].start.y < pair[1].start.y);
            }
        }
        for segment in &segments {
            assert!(segment.start.x <= segment.end.x);
            assert_eq!(segment.start.y, segment.end.y);
        }
    }

    #[test]
    fn test_step_shape_drops_unpaired_intersection() {
        // At y=2 the step vertex contributes x=2 and x=4 on top of the
        // left wall at x=0; the trailing x=4 must be dropped.
        let step = polygon(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (4.0, 2.0),
            (4.0, 4.0),
            (0.0, 4.0),
        ]);
        let segments = fill_polygon(&step, 1.0).expect("step has interior");

        let at_y2: Vec<&FillSegment> = segments
            .iter()
            .filter(|s| (s.start.y - 2.0).abs() <= COORD_EPS)
            .collect();
        assert_eq!(at_y2.len(), 1);
        assert_eq!(at_y2[0].start.x, 0.0);
        assert_eq!(at_y2[0].end.x, 2.0);

        // Other rows each carry exactly one span across the full arm.
        let at_y3: Vec<&FillSegment> = segments
            .iter()
            .filter(|s| (s.start.y - 3.0).abs() <= COORD_EPS)
            .collect();
        assert_eq!(at_y3.len(), 1);
        assert_eq!(at_y3[0].end.x, 4.0);
    }

    #[test]
    fn test_self_intersecting_boundary_is_deterministic() {
        let bowtie = polygon(&[(0.0, 0.0), (4.0, 4.0), (4.0, 0.0), (0.0, 4.0)]);
        let first = fill_polygon(&bowtie, 1.0).expect("bowtie has interior");
        let second = fill_polygon(&bowtie, 1.0).expect("bowtie has interior");
        assert_eq!(first, second);

        // The crossing row pairs off as two spans meeting in the middle.
        let at_y2: Vec<&FillSegment> = first
            .iter()
            .filter(|s| (s.start.y - 2.0).abs() <= COORD_EPS)
            .collect();
        assert_eq!(at_y2.len(), 2);
        assert_eq!(at_y2[0].start.x, 0.0);
        assert_eq!(at_y2[0].end.x, 2.0);
        assert_eq!(at_y2[1].start.x, 2.0);
        assert_eq!(at_y2[1].end.x, 4.0);
    }

    #[test]
    fn test_star_polygon_pairs_every_row() {
        // Pentagram with no horizontal edges; rows cross up to four
        // edges and every row must pair off cleanly.
        let star = polygon(&[
            (-1.56, 9.88),
            (-4.54, -8.91),
            (8.91, 4.54),
            (-9.88, 1.56),
            (7.07, -7.07),
        ]);
        let first = fill_polygon(&star, 1.0).expect("star has interior");
        let second = fill_polygon(&star, 1.0).expect("star has interior");

        assert_eq!(first, second);
        assert!(!first.is_empty());
        for segment in &first {
            assert!(segment.start.x <= segment.end.x);
            assert_eq!(segment.start.y, segment.end.y);
        }
    }

    #[test]
    fn test_flat_sliver_is_degenerate() {
        // Every edge is within the epsilon of horizontal, so no row
        // collects an intersection.
        let sliver = polygon(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0005)]);
        assert!(matches!(
            fill_polygon(&sliver, 1.0),
            Err(StitchError::DegenerateFill)
        ));
    }

    #[test]
    fn test_rows_past_the_shape_emit_nothing() {
        // Height 2.5 at spacing 1 processes rows y=0,1,2,3; the y=3 row
        // lies past the apex and must stay empty.
        let triangle = polygon(&[(0.0, 0.0), (4.0, 0.0), (2.0, 2.5)]);
        let segments = fill_polygon(&triangle, 1.0).expect("triangle has interior");

        assert_eq!(scan_row_count(2.5, 1.0), 4);
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.start.y <= 2.0));
    }

    #[test]
    fn test_uniform_rescale_preserves_span_topology() {
        let base = polygon(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]);
        let scaled = polygon(&[(0.0, 0.0), (12.0, 0.0), (12.0, 12.0), (0.0, 12.0)]);

        let base_segments = fill_polygon(&base, 1.0).expect("has interior");
        let scaled_segments = fill_polygon(&scaled, 4.0).expect("has interior");

        assert_eq!(base_segments.len(), scaled_segments.len());
        for (a, b) in base_segments.iter().zip(scaled_segments.iter()) {
            assert_eq!(a.start.x * 4.0, b.start.x);
            assert_eq!(a.end.x * 4.0, b.end.x);
            assert_eq!(a.start.y * 4.0, b.start.y);
        }
    }
}
