//! Error types for segscore.

use thiserror::Error;

/// Errors raised while loading the tables or scoring predictions.
///
/// All of these abort the current evaluation; there is no partial scoring.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Malformed segment encoding: odd number of values or an unparsable token.
    #[error("Wrong prediction format: {0}")]
    Format(String),
    /// A predicted segment runs past the 512*512 pixel grid.
    #[error("Maximum pixel index exceeds maximum image size (512*512)")]
    Bounds,
    /// Structural mismatch between the ground-truth and prediction tables.
    #[error("{0}")]
    Schema(String),
    /// Both masks of a row decode to zero pixels, leaving IoU undefined.
    #[error("Row decodes to an empty pixel set on both sides; IoU is undefined")]
    EmptyMask,
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
