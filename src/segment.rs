//! Color segmentation: reduce an image to a small palette plus a
//! per-pixel label grid.

use std::cmp::Ordering;

use image::RgbImage;
use palette::{color_difference::Ciede2000, white_point::D65, FromColor, Lab, Srgb};
use rayon::prelude::*;

use crate::color::Color;
use crate::error::{StitchError, StitchResult};

/// A quantized image: an ordered palette of distinct colors and one
/// label per pixel, row-major.
///
/// A label is either an index into the palette or
/// [`Segmentation::BACKGROUND`] for pixels no palette color claims;
/// background pixels are never stitched.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    palette: Vec<Color>,
    labels: Vec<u16>,
    width: u32,
    height: u32,
}

impl Segmentation {
    /// Label for pixels outside every palette color.
    pub const BACKGROUND: u16 = u16::MAX;

    /// Assemble a segmentation. `labels` must hold `width * height`
    /// entries in row-major order.
    pub fn new(palette: Vec<Color>, labels: Vec<u16>, width: u32, height: u32) -> Segmentation {
        Segmentation {
            palette,
            labels,
            width,
            height,
        }
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn labels(&self) -> &[u16] {
        &self.labels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 0/1 mask of the pixels labeled `index`.
    pub fn mask(&self, index: usize) -> Vec<u8> {
        self.labels
            .iter()
            .map(|&label| u8::from(label as usize == index))
            .collect()
    }
}

/// Reduces an image to at most `max_colors` representative colors.
///
/// Implementations must label every pixel with either a palette index
/// or [`Segmentation::BACKGROUND`], and must be deterministic: the same
/// image always yields the same segmentation.
pub trait ColorSegmenter {
    fn segment(&self, image: &RgbImage, max_colors: usize) -> StitchResult<Segmentation>;
}

/// Deterministic k-means quantizer in CIE Lab space.
///
/// Seeding uses the median-luminance pixel and then farthest-point
/// selection instead of random restarts, so repeated runs over the same
/// image produce identical palettes. Distances are CIEDE2000.
#[derive(Debug, Clone)]
pub struct KMeansSegmenter {
    pub max_iterations: usize,
}

impl Default for KMeansSegmenter {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

impl ColorSegmenter for KMeansSegmenter {
    fn segment(&self, image: &RgbImage, max_colors: usize) -> StitchResult<Segmentation> {
        let (width, height) = image.dimensions();
        let pixels: Vec<Lab<D65, f32>> = image
            .as_raw()
            .par_chunks_exact(3)
            .map(|px| rgb_to_lab([px[0], px[1], px[2]]))
            .collect();

        if pixels.is_empty() || max_colors == 0 {
            return Err(StitchError::EmptyPalette);
        }

        let k = max_colors.min(pixels.len()).min(u16::MAX as usize);
        let (centers, mut labels) = kmeans(&pixels, k, self.max_iterations);

        let palette = dedupe_palette(centers.iter().map(|&lab| lab_to_color(lab)).collect(), &mut labels);
        Ok(Segmentation::new(palette, labels, width, height))
    }
}

/// Binary luma-threshold segmenter: dark pixels become the single
/// palette color, light pixels are background.
///
/// Covers the classic dark-on-light outline workflow. Pixels whose
/// Rec. 601 luma is at or below `threshold` are foreground.
#[derive(Debug, Clone)]
pub struct ThresholdSegmenter {
    pub threshold: u8,
    pub foreground: Color,
}

impl Default for ThresholdSegmenter {
    fn default() -> Self {
        Self {
            threshold: 127,
            foreground: Color::BLACK,
        }
    }
}

impl ColorSegmenter for ThresholdSegmenter {
    fn segment(&self, image: &RgbImage, _max_colors: usize) -> StitchResult<Segmentation> {
        let (width, height) = image.dimensions();
        let threshold = self.threshold as f32;
        let labels: Vec<u16> = image
            .as_raw()
            .par_chunks_exact(3)
            .map(|px| {
                let luma = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                if luma <= threshold {
                    0
                } else {
                    Segmentation::BACKGROUND
                }
            })
            .collect();
        Ok(Segmentation::new(
            vec![self.foreground],
            labels,
            width,
            height,
        ))
    }
}

fn kmeans(pixels: &[Lab<D65, f32>], k: usize, max_iterations: usize) -> (Vec<Lab<D65, f32>>, Vec<u16>) {
    let mut centers = seed_centers(pixels, k);
    let mut labels = vec![0u16; pixels.len()];

    for iteration in 0..max_iterations {
        let new_labels: Vec<u16> = pixels
            .par_iter()
            .map(|&pixel| nearest_center(pixel, &centers))
            .collect();

        let changed = new_labels
            .iter()
            .zip(labels.iter())
            .filter(|(a, b)| a != b)
            .count();
        labels = new_labels;
        if changed == 0 && iteration > 0 {
            log::debug!("k-means converged after {iteration} iterations");
            break;
        }

        // Accumulate centroids in f64; per-cluster sums over large
        // images overflow f32 precision.
        let mut sums = vec![(0.0f64, 0.0f64, 0.0f64, 0u64); centers.len()];
        for (pixel, &label) in pixels.iter().zip(labels.iter()) {
            let sum = &mut sums[label as usize];
            sum.0 += pixel.l as f64;
            sum.1 += pixel.a as f64;
            sum.2 += pixel.b as f64;
            sum.3 += 1;
        }
        for (center, &(l, a, b, count)) in centers.iter_mut().zip(sums.iter()) {
            if count > 0 {
                *center = Lab::new(
                    (l / count as f64) as f32,
                    (a / count as f64) as f32,
                    (b / count as f64) as f32,
                );
            }
        }
    }

    (centers, labels)
}

/// Median-luminance pixel first, then farthest-point selection. No RNG
/// anywhere, so seeding is a pure function of the pixel data.
fn seed_centers(pixels: &[Lab<D65, f32>], k: usize) -> Vec<Lab<D65, f32>> {
    let mut order: Vec<usize> = (0..pixels.len()).collect();
    order.sort_by(|&a, &b| {
        pixels[a]
            .l
            .partial_cmp(&pixels[b].l)
            .unwrap_or(Ordering::Equal)
    });
    let first = order[pixels.len() / 2];

    let mut centers = vec![pixels[first]];
    let mut chosen = vec![false; pixels.len()];
    chosen[first] = true;

    let mut min_distances: Vec<f32> = pixels
        .par_iter()
        .map(|&pixel| pixel.difference(centers[0]))
        .collect();

    while centers.len() < k {
        let mut best_idx = None;
        let mut best_dist = -1.0f32;
        for (i, &dist) in min_distances.iter().enumerate() {
            if !chosen[i] && dist > best_dist {
                best_dist = dist;
                best_idx = Some(i);
            }
        }
        let Some(next) = best_idx else {
            break;
        };
        chosen[next] = true;
        let center = pixels[next];
        min_distances
            .par_iter_mut()
            .zip(pixels.par_iter())
            .for_each(|(min_dist, &pixel)| {
                let dist = pixel.difference(center);
                if dist < *min_dist {
                    *min_dist = dist;
                }
            });
        centers.push(center);
    }

    centers
}

fn nearest_center(pixel: Lab<D65, f32>, centers: &[Lab<D65, f32>]) -> u16 {
    let mut best_idx = 0u16;
    let mut best_dist = f32::MAX;
    for (i, &center) in centers.iter().enumerate() {
        let dist = pixel.difference(center);
        if dist < best_dist {
            best_dist = dist;
            best_idx = i as u16;
        }
    }
    best_idx
}

/// Distinct Lab centers can round to the same 8-bit color; collapse
/// repeats so the palette never lists a color twice.
fn dedupe_palette(palette: Vec<Color>, labels: &mut [u16]) -> Vec<Color> {
    let mut unique: Vec<Color> = Vec::with_capacity(palette.len());
    let mut remap: Vec<u16> = Vec::with_capacity(palette.len());
    for color in palette {
        match unique.iter().position(|&c| c == color) {
            Some(existing) => remap.push(existing as u16),
            None => {
                unique.push(color);
                remap.push((unique.len() - 1) as u16);
            }
        }
    }
    for label in labels.iter_mut() {
        *label = remap[*label as usize];
    }
    unique
}

fn rgb_to_lab(rgb: [u8; 3]) -> Lab<D65, f32> {
    let srgb = Srgb::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    );
    Lab::from_color(srgb)
}

fn lab_to_color(lab: Lab<D65, f32>) -> Color {
    let srgb = Srgb::from_color(lab);
    Color::new(
        (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn two_tone_image() -> RgbImage {
        // Left half black, right half white.
        RgbImage::from_fn(4, 4, |x, _| {
            if x < 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_kmeans_is_deterministic() {
        let image = RgbImage::from_fn(8, 8, |x, y| match (x / 3 + y / 3) % 3 {
            0 => Rgb([220, 40, 40]),
            1 => Rgb([40, 220, 40]),
            _ => Rgb([40, 40, 220]),
        });
        let segmenter = KMeansSegmenter::default();

        let first = segmenter.segment(&image, 3).expect("segmentation succeeds");
        let second = segmenter.segment(&image, 3).expect("segmentation succeeds");

        assert_eq!(first, second);
        assert_eq!(first.palette().len(), 3);
    }

    #[test]
    fn test_two_colors_split_exactly() {
        let image = two_tone_image();
        let segmentation = KMeansSegmenter::default()
            .segment(&image, 2)
            .expect("segmentation succeeds");

        assert_eq!(segmentation.palette().len(), 2);
        assert!(segmentation.palette().contains(&Color::BLACK));
        assert!(segmentation.palette().contains(&Color::WHITE));

        // Every label resolves to the pixel's own color.
        for (i, &label) in segmentation.labels().iter().enumerate() {
            let x = i as u32 % 4;
            let expected = if x < 2 { Color::BLACK } else { Color::WHITE };
            assert_eq!(segmentation.palette()[label as usize], expected);
        }
    }

    #[test]
    fn test_solid_image_collapses_to_one_color() {
        let image = RgbImage::from_pixel(3, 3, Rgb([10, 20, 30]));
        let segmentation = KMeansSegmenter::default()
            .segment(&image, 5)
            .expect("segmentation succeeds");

        assert_eq!(segmentation.palette(), &[Color::new(10, 20, 30)]);
        assert!(segmentation.labels().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_empty_image_is_empty_palette() {
        let image = RgbImage::new(0, 0);
        let result = KMeansSegmenter::default().segment(&image, 3);
        assert!(matches!(result, Err(StitchError::EmptyPalette)));
    }

    #[test]
    fn test_mask_selects_single_label() {
        let segmentation = Segmentation::new(
            vec![Color::BLACK, Color::WHITE],
            vec![0, 1, 1, 0],
            2,
            2,
        );
        assert_eq!(segmentation.mask(0), vec![1, 0, 0, 1]);
        assert_eq!(segmentation.mask(1), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_threshold_splits_dark_from_light() {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([0, 0, 0]));
        image.put_pixel(1, 0, Rgb([255, 255, 255]));
        image.put_pixel(0, 1, Rgb([100, 100, 100]));
        image.put_pixel(1, 1, Rgb([200, 200, 200]));

        let segmentation = ThresholdSegmenter::default()
            .segment(&image, 1)
            .expect("segmentation succeeds");

        assert_eq!(segmentation.palette(), &[Color::BLACK]);
        assert_eq!(segmentation.labels()[0], 0);
        assert_eq!(segmentation.labels()[1], Segmentation::BACKGROUND);
        assert_eq!(segmentation.labels()[2], 0);
        assert_eq!(segmentation.labels()[3], Segmentation::BACKGROUND);
        assert_eq!(segmentation.mask(0), vec![1, 0, 1, 0]);
    }
}
