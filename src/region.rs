//! Region extraction: 4-connected components of a color mask and their
//! outer boundary polygons.
//!
//! Boundaries are traced on the pixel corner lattice, so a solid WxH
//! mask comes back as the rectangle (0,0) (W,0) (W,H) (0,H) and fill
//! rows later land on whole pixel rows.

use std::collections::{HashMap, VecDeque};

use crate::geometry::{Point, Polygon};

const NO_REGION: usize = usize::MAX;

/// Integer point on the pixel corner lattice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct GridPoint {
    x: i32,
    y: i32,
}

/// Outer boundary polygons of every connected region of set pixels.
///
/// `mask` is row-major with nonzero meaning set. Regions covering fewer
/// than `min_region_px` pixels are dropped, as is any boundary that does
/// not survive as a valid polygon. Regions come back in scan order of
/// their first pixel, so the output is fully determined by the mask.
pub fn extract_regions(
    mask: &[u8],
    width: u32,
    height: u32,
    min_region_px: usize,
) -> Vec<Polygon> {
    let w = width as usize;
    let h = height as usize;
    let len = w * h;
    if len == 0 || mask.len() != len {
        return Vec::new();
    }

    // 1. Label 4-connected components.
    let mut region_grid = vec![NO_REGION; len];
    let mut region_cells: Vec<Vec<usize>> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for start in 0..len {
        if mask[start] == 0 || region_grid[start] != NO_REGION {
            continue;
        }
        let id = region_cells.len();
        let mut cells = Vec::new();
        region_grid[start] = id;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            cells.push(idx);
            let x = idx % w;
            let y = idx / w;

            if x > 0 && mask[idx - 1] != 0 && region_grid[idx - 1] == NO_REGION {
                region_grid[idx - 1] = id;
                queue.push_back(idx - 1);
            }
            if x + 1 < w && mask[idx + 1] != 0 && region_grid[idx + 1] == NO_REGION {
                region_grid[idx + 1] = id;
                queue.push_back(idx + 1);
            }
            if y > 0 && mask[idx - w] != 0 && region_grid[idx - w] == NO_REGION {
                region_grid[idx - w] = id;
                queue.push_back(idx - w);
            }
            if y + 1 < h && mask[idx + w] != 0 && region_grid[idx + w] == NO_REGION {
                region_grid[idx + w] = id;
                queue.push_back(idx + w);
            }
        }
        region_cells.push(cells);
    }

    // 2. Trace each surviving region's boundary loops and keep the outer one.
    let mut polygons = Vec::new();
    for (id, cells) in region_cells.iter().enumerate() {
        if cells.len() < min_region_px {
            continue;
        }
        let loops = build_region_loops(w, h, &region_grid, id, cells);
        let Some(outer) = pick_outer_loop(&loops) else {
            continue;
        };
        let points = outer
            .iter()
            .map(|p| Point::new(p.x as f32, p.y as f32))
            .collect();
        match Polygon::new(points) {
            Ok(polygon) => polygons.push(polygon),
            Err(err) => log::debug!("dropping boundary of region {id}: {err}"),
        }
    }
    polygons
}

/// Boundary edges of one region chained into closed corner-lattice
/// loops, straight runs collapsed. Loops keep a closing repeat of their
/// first point.
fn build_region_loops(
    w: usize,
    h: usize,
    region_grid: &[usize],
    region_id: usize,
    cells: &[usize],
) -> Vec<Vec<GridPoint>> {
    // One directed edge per pixel side facing a foreign or out-of-bounds
    // pixel, wound clockwise in the y-down frame.
    let mut segments: Vec<(GridPoint, GridPoint)> = Vec::new();
    for &idx in cells {
        let x = (idx % w) as i32;
        let y = (idx / w) as i32;

        if idx < w || region_grid[idx - w] != region_id {
            segments.push((GridPoint { x, y }, GridPoint { x: x + 1, y }));
        }
        if idx % w + 1 >= w || region_grid[idx + 1] != region_id {
            segments.push((
                GridPoint { x: x + 1, y },
                GridPoint { x: x + 1, y: y + 1 },
            ));
        }
        if idx / w + 1 >= h || region_grid[idx + w] != region_id {
            segments.push((
                GridPoint { x: x + 1, y: y + 1 },
                GridPoint { x, y: y + 1 },
            ));
        }
        if idx % w == 0 || region_grid[idx - 1] != region_id {
            segments.push((GridPoint { x, y: y + 1 }, GridPoint { x, y }));
        }
    }

    segments.sort();

    let mut outgoing: HashMap<GridPoint, Vec<usize>> = HashMap::new();
    for (i, segment) in segments.iter().enumerate() {
        outgoing.entry(segment.0).or_default().push(i);
    }
    for candidates in outgoing.values_mut() {
        candidates.sort_by_key(|&i| (direction_rank(segments[i].0, segments[i].1), i));
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let origin = segments[start].0;
        let mut loop_points = vec![segments[start].0, segments[start].1];
        let mut cursor = segments[start].1;
        let mut safety = segments.len() + 2;

        while cursor != origin && safety > 0 {
            safety -= 1;
            let next = outgoing
                .get(&cursor)
                .and_then(|candidates| candidates.iter().find(|&&i| !used[i]).copied());
            let Some(next) = next else {
                break;
            };
            used[next] = true;
            cursor = segments[next].1;
            loop_points.push(cursor);
        }

        if loop_points.len() >= 4 && loop_points.first() == loop_points.last() {
            loops.push(collapse_straight_runs(loop_points));
        }
    }

    loops.sort_by_key(|l| loop_sort_key(l));
    loops
}

/// Remove lattice points that continue a straight horizontal or
/// vertical run. Input and output both carry the closing repeat.
fn collapse_straight_runs(mut points: Vec<GridPoint>) -> Vec<GridPoint> {
    points.pop();
    let n = points.len();
    let mut kept = Vec::with_capacity(n);

    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];
        let straight = (prev.x == curr.x && curr.x == next.x)
            || (prev.y == curr.y && curr.y == next.y);
        if !straight {
            kept.push(curr);
        }
    }

    if let Some(&first) = kept.first() {
        kept.push(first);
    }
    kept
}

/// The boundary loop enclosing the region body: the one with the
/// largest absolute area. Hole loops are strictly smaller.
fn pick_outer_loop(loops: &[Vec<GridPoint>]) -> Option<&Vec<GridPoint>> {
    let mut best: Option<(&Vec<GridPoint>, i64)> = None;
    for candidate in loops {
        let area2 = loop_area2(candidate).abs();
        if best.map_or(true, |(_, best_area)| area2 > best_area) {
            best = Some((candidate, area2));
        }
    }
    best.map(|(l, _)| l)
}

/// Twice the signed shoelace area of a closed lattice loop.
fn loop_area2(points: &[GridPoint]) -> i64 {
    let mut area2 = 0i64;
    for pair in points.windows(2) {
        area2 += pair[0].x as i64 * pair[1].y as i64 - pair[1].x as i64 * pair[0].y as i64;
    }
    area2
}

fn loop_sort_key(points: &[GridPoint]) -> (i32, i32, usize) {
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0);
    (min_y, min_x, points.len())
}

/// Tie-break order for outgoing boundary edges at a shared corner:
/// right, down, left, up.
fn direction_rank(from: GridPoint, to: GridPoint) -> u8 {
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    match (dx, dy) {
        (1, 0) => 0,
        (0, 1) => 1,
        (-1, 0) => 2,
        (0, -1) => 3,
        _ => 4,
    }
}
