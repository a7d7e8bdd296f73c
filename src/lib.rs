//! Raster images to machine embroidery stitch programs.
//!
//! The pipeline quantizes an image to a small thread palette, extracts
//! each color's connected regions as boundary polygons, simplifies the
//! boundaries to stitch resolution and renders them as scan-line fill
//! spans or running-stitch outlines, assembled into one linear
//! [`Pattern`] of moves, stitches, color changes and trims. A
//! [`PatternEncoder`] turns the finished pattern into bytes for
//! whatever stitch file format sits downstream.
//!
//! ```no_run
//! use needletrace::{convert_bytes, StitchConfig};
//!
//! let bytes = std::fs::read("logo.png")?;
//! let pattern = convert_bytes(&bytes, &StitchConfig::default())?;
//! println!("{} stitches", pattern.stitch_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod color;
pub mod config;
pub mod encode;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod pattern;
pub mod pipeline;
pub mod region;
pub mod segment;
pub mod simplify;

pub use assembler::{assemble, ColorFragment};
pub use color::Color;
pub use config::{OutputSize, RenderMode, Scale, StitchConfig, COORD_EPS};
pub use encode::{JsonEncoder, PatternEncoder};
pub use error::{StitchError, StitchResult};
pub use fill::FillSegment;
pub use geometry::{Bounds, Point, Polygon};
pub use pattern::{Pattern, StitchCommand, Thread, ThreadId};
pub use pipeline::{convert_bytes, convert_image, convert_with_segmenter};
pub use segment::{ColorSegmenter, KMeansSegmenter, Segmentation, ThresholdSegmenter};
