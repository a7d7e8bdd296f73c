//! Pattern encoding seam.
//!
//! Binary stitch-format writers (DST, PES and friends) live outside
//! this crate; they plug in through [`PatternEncoder`] and receive a
//! finished, validated [`Pattern`].

use crate::error::{StitchError, StitchResult};
use crate::pattern::Pattern;

/// Serializes a finished pattern to bytes.
pub trait PatternEncoder {
    fn encode(&self, pattern: &Pattern) -> StitchResult<Vec<u8>>;
}

/// Reference encoder: the pattern as JSON.
///
/// Stands in for binary stitch writers in tests and tooling, and doubles
/// as a debug dump of an assembled program.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder;

impl PatternEncoder for JsonEncoder {
    fn encode(&self, pattern: &Pattern) -> StitchResult<Vec<u8>> {
        serde_json::to_vec(pattern).map_err(|e| StitchError::Encode(e.to_string()))
    }
}
