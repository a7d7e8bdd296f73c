//! End-to-end conversion: raster image in, stitch program out.

use std::time::Instant;

use image::RgbImage;
use rayon::prelude::*;

use crate::assembler::{assemble, ColorFragment};
use crate::color::Color;
use crate::config::{RenderMode, Scale, StitchConfig};
use crate::error::{StitchError, StitchResult};
use crate::fill::fill_polygon;
use crate::geometry::Polygon;
use crate::pattern::Pattern;
use crate::region::extract_regions;
use crate::segment::{ColorSegmenter, KMeansSegmenter, Segmentation};
use crate::simplify::{simplify_polygon, simplify_spacing};

/// Convert an image with the default k-means segmenter.
pub fn convert_image(image: &RgbImage, config: &StitchConfig) -> StitchResult<Pattern> {
    convert_with_segmenter(image, &KMeansSegmenter::default(), config)
}

/// Decode image bytes (any format the image crate understands) and
/// convert the result.
pub fn convert_bytes(bytes: &[u8], config: &StitchConfig) -> StitchResult<Pattern> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    convert_image(&image, config)
}

/// Convert an image with a caller-provided segmenter.
///
/// Each palette color is rendered into a command fragment by its own
/// worker: extract the color's regions, scale them to output units,
/// simplify, then fill or outline. Fragments are assembled in palette
/// order, so the output never depends on worker scheduling. Region-level
/// failures are skipped with a debug log; anything else aborts.
pub fn convert_with_segmenter(
    image: &RgbImage,
    segmenter: &impl ColorSegmenter,
    config: &StitchConfig,
) -> StitchResult<Pattern> {
    let started = Instant::now();
    let (width, height) = image.dimensions();
    let max_colors = config.max_colors.clamp(1, 64);

    let segmentation = segmenter.segment(image, max_colors)?;
    if segmentation.palette().is_empty() {
        return Err(StitchError::EmptyPalette);
    }
    log::debug!(
        "segmented {}x{} image into {} colors",
        width,
        height,
        segmentation.palette().len()
    );

    let scale = Scale::for_output(width, height, &config.output);

    let fragments: StitchResult<Vec<ColorFragment>> = segmentation
        .palette()
        .par_iter()
        .enumerate()
        .map(|(index, &color)| color_fragment(&segmentation, index, color, scale, config))
        .collect();

    let pattern = assemble(fragments?)?;
    log::info!(
        "assembled {} commands, {} stitches, {} threads in {}ms",
        pattern.commands().len(),
        pattern.stitch_count(),
        pattern.threads().len(),
        started.elapsed().as_millis()
    );
    Ok(pattern)
}

/// Build the command fragment for one palette color.
fn color_fragment(
    segmentation: &Segmentation,
    index: usize,
    color: Color,
    scale: Scale,
    config: &StitchConfig,
) -> StitchResult<ColorFragment> {
    let mask = segmentation.mask(index);
    let regions = extract_regions(
        &mask,
        segmentation.width(),
        segmentation.height(),
        config.min_region_px,
    );
    log::debug!("color {}: {} regions", color.to_hex(), regions.len());

    let mut fragment = ColorFragment::new(color);
    for region in &regions {
        match render_region(&mut fragment, region, scale, config) {
            Ok(()) => {}
            Err(err) if err.is_recoverable() => {
                log::debug!("skipping region of color {}: {err}", color.to_hex());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(fragment)
}

/// Scale, simplify and render one region boundary into the fragment.
/// Commands are appended only after every fallible step has passed, so
/// a skipped region leaves no trace in the fragment.
fn render_region(
    fragment: &mut ColorFragment,
    region: &Polygon,
    scale: Scale,
    config: &StitchConfig,
) -> StitchResult<()> {
    let scaled = Polygon::new(region.points().iter().map(|&p| scale.apply(p)).collect())?;
    let epsilon = config.simplify_ratio * scaled.perimeter();
    let simplified = simplify_polygon(&scaled, epsilon)?;

    match config.render_mode {
        RenderMode::Fill => {
            let segments = fill_polygon(&simplified, config.row_spacing)?;
            fragment.push_fill(&segments);
        }
        RenderMode::Outline => {
            let path = simplify_spacing(simplified.points(), config.min_stitch_len)?;
            fragment.push_outline(&path);
        }
    }
    Ok(())
}
