//! Error types for the stitch conversion pipeline.

use thiserror::Error;

/// Errors produced while turning an image into a stitch program.
///
/// Region-level kinds (`InvalidPolygon`, `PathTooShort`, `DegenerateFill`)
/// are caught inside the pipeline, which skips the offending region and
/// keeps going. Everything else aborts the conversion.
#[derive(Debug, Error)]
pub enum StitchError {
    /// Segmentation produced no colors, so there is nothing to stitch.
    #[error("empty palette: segmentation produced no colors")]
    EmptyPalette,

    /// A region boundary kept fewer than 3 distinct vertices.
    #[error("invalid polygon: {got} distinct vertices, need at least 3")]
    InvalidPolygon { got: usize },

    /// Spacing simplification left fewer than 2 stitch points.
    #[error("path too short to stitch after spacing simplification")]
    PathTooShort,

    /// No scan row crossed the polygon interior.
    #[error("degenerate fill: no scan row produced an interior span")]
    DegenerateFill,

    /// The assembled command sequence violates the stitch-program
    /// invariant. Always a defect in the assembler, never in the input.
    #[error("malformed command sequence: {0}")]
    MalformedCommand(String),

    /// The input bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// A pattern encoder failed to serialize the pattern.
    #[error("failed to encode pattern: {0}")]
    Encode(String),
}

/// Result alias used across the crate.
pub type StitchResult<T> = Result<T, StitchError>;

impl StitchError {
    /// Region-level errors are skipped by the pipeline; everything else
    /// aborts the whole conversion.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StitchError::InvalidPolygon { .. }
                | StitchError::PathTooShort
                | StitchError::DegenerateFill
        )
    }
}
