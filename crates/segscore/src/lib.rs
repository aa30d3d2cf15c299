pub mod error;
pub mod eval;
pub mod mask;
pub mod types;

pub use error::EvalError;
pub use eval::{aggregate, evaluate, load_result, EvalRows};
pub use types::{GroundTruthRecord, PredictionRecord, Scores, CLASSES, IMAGE_SIZE, MAX_PIXEL};
