//! Conversion settings and the pixel-to-output-unit scale contract.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Coordinate comparison tolerance, in output units.
///
/// Scan-row touch tests and horizontal-edge detection compare through
/// this epsilon instead of exact float equality.
pub const COORD_EPS: f32 = 1e-3;

/// How region interiors are rendered as stitches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Solid scan-line fill of each region interior.
    Fill,
    /// Running-stitch outline along each region boundary.
    Outline,
}

/// Physical size the stitched output should come out at.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSize {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Output units per millimeter. Embroidery formats commonly use
    /// 0.1 mm units, i.e. 10 units per millimeter.
    pub units_per_mm: f32,
}

impl Default for OutputSize {
    fn default() -> Self {
        Self {
            width_mm: 200.0,
            height_mm: 100.0,
            units_per_mm: 10.0,
        }
    }
}

/// Per-axis pixel-to-output-unit factors.
///
/// Applied once, right after region extraction. Every later stage
/// (simplification, fill, spacing) works in output units, so all
/// tolerances in [`StitchConfig`] are output-unit quantities.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    /// Identity scale: output units are pixel units.
    pub const UNIT: Scale = Scale { x: 1.0, y: 1.0 };

    /// Factors that stretch a `width_px` x `height_px` image to the
    /// requested physical size.
    pub fn for_output(width_px: u32, height_px: u32, output: &OutputSize) -> Scale {
        Scale {
            x: output.width_mm * output.units_per_mm / width_px as f32,
            y: output.height_mm * output.units_per_mm / height_px as f32,
        }
    }

    pub fn apply(self, point: Point) -> Point {
        Point::new(point.x * self.x, point.y * self.y)
    }
}

/// Settings for one image-to-pattern conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchConfig {
    /// Upper bound on the palette size requested from the segmenter.
    /// Clamped to 1..=64 by the pipeline.
    pub max_colors: usize,
    /// Fill region interiors or outline their boundaries.
    pub render_mode: RenderMode,
    /// Vertical distance between fill scan rows, in output units.
    pub row_spacing: f32,
    /// Minimum distance between consecutive outline stitches, in output
    /// units.
    pub min_stitch_len: f32,
    /// Boundary simplification tolerance as a fraction of each polygon's
    /// perimeter.
    pub simplify_ratio: f32,
    /// Connected regions covering fewer pixels than this are dropped
    /// before tracing.
    pub min_region_px: usize,
    /// Physical output size the pixel scale is derived from.
    pub output: OutputSize,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            max_colors: 5,
            render_mode: RenderMode::Fill,
            row_spacing: 1.0,
            min_stitch_len: 5.0,
            simplify_ratio: 0.005,
            min_region_px: 4,
            output: OutputSize::default(),
        }
    }
}
