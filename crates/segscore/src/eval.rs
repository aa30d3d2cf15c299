//! Loading and scoring of ground-truth / prediction tables.
//!
//! The loader validates the structural contract between the two CSV tables
//! (columns, row counts, img_id set and order, class labels, non-empty
//! predictions), decodes every row, and computes per-row IoU. The aggregator
//! then averages IoU over the public and private splits per class.

use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;
use serde::de::DeserializeOwned;

use crate::error::EvalError;
use crate::mask;
use crate::types::{class_code, GroundTruthRecord, PredictionRecord, Scores, CLASSES};

/// Per-row evaluation output: three parallel sequences aligned by row.
#[derive(Debug, Clone)]
pub struct EvalRows {
    /// Ground-truth class code per row.
    pub classes: Vec<u32>,
    /// IoU per row.
    pub ious: Vec<f64>,
    /// Whether the row belongs to the public split.
    pub public: Vec<bool>,
}

/// Read a CSV table into typed records, keeping the raw header row for
/// schema validation.
fn load_table<T: DeserializeOwned>(path: &Path) -> Result<(Vec<String>, Vec<T>), EvalError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let records = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok((headers, records))
}

/// Check the structural contract between the two tables.
///
/// Runs before any decoding; each violation carries a distinct message and
/// aborts the evaluation.
fn validate(
    gt_headers: &[String],
    gt_rows: &[GroundTruthRecord],
    pred_headers: &[String],
    pred_rows: &[PredictionRecord],
) -> Result<(), EvalError> {
    let gt_cols: HashSet<&str> = gt_headers
        .iter()
        .map(String::as_str)
        .filter(|&c| c != "public")
        .collect();
    let pred_cols: HashSet<&str> = pred_headers.iter().map(String::as_str).collect();
    if gt_cols != pred_cols {
        return Err(EvalError::Schema(
            "Column names of prediction and answer are not the same".to_string(),
        ));
    }

    if gt_rows.len() != pred_rows.len() {
        return Err(EvalError::Schema(
            "The number of predictions and answers are not the same".to_string(),
        ));
    }

    let gt_ids: HashSet<&str> = gt_rows.iter().map(|r| r.img_id.as_str()).collect();
    let pred_ids: HashSet<&str> = pred_rows.iter().map(|r| r.img_id.as_str()).collect();
    if gt_ids != pred_ids {
        return Err(EvalError::Schema(
            "Prediction is missing or contains extra img_id".to_string(),
        ));
    }

    if gt_rows
        .iter()
        .zip(pred_rows)
        .any(|(gt, pred)| gt.img_id != pred.img_id)
    {
        return Err(EvalError::Schema(
            "img_id should be ordered as the sample submission".to_string(),
        ));
    }

    if pred_rows
        .iter()
        .any(|r| class_code(&r.class_label).is_none())
    {
        return Err(EvalError::Schema("Invalid class type included.".to_string()));
    }

    if pred_rows.iter().any(|r| r.prediction.trim().is_empty()) {
        return Err(EvalError::Schema(
            "Either an empty or an invalid value exists".to_string(),
        ));
    }

    Ok(())
}

/// Map class labels to numeric codes, failing on any unrecognized label.
fn map_classes<'a>(labels: impl Iterator<Item = &'a str>) -> Result<Vec<u32>, EvalError> {
    labels
        .map(|label| {
            class_code(label)
                .ok_or_else(|| EvalError::Schema("Invalid class type included.".to_string()))
        })
        .collect()
}

/// Load both tables, validate their structure, and compute per-row IoU.
///
/// All validation and decoding runs sequentially before any IoU work, so the
/// first invalid row is the one reported; the per-row IoU pass itself is
/// parallel (rows are independent).
pub fn load_result(gt_path: &Path, pred_path: &Path) -> Result<EvalRows, EvalError> {
    let (gt_headers, gt_rows) = load_table::<GroundTruthRecord>(gt_path)?;
    let (pred_headers, pred_rows) = load_table::<PredictionRecord>(pred_path)?;
    validate(&gt_headers, &gt_rows, &pred_headers, &pred_rows)?;

    let gt_classes = map_classes(gt_rows.iter().map(|r| r.class_label.as_str()))?;
    let pred_classes = map_classes(pred_rows.iter().map(|r| r.class_label.as_str()))?;

    // Decode and validate every row up front; the parallel pass cannot fail.
    let mut decoded = Vec::with_capacity(gt_rows.len());
    for (i, (gt, pred)) in gt_rows.iter().zip(&pred_rows).enumerate() {
        let gt_pairs = mask::pairs(&mask::parse_counts(&gt.prediction)?)?;
        let pred_pairs = mask::pairs(&mask::parse_counts(&pred.prediction)?)?;
        mask::validate_extent(&pred_pairs)?;
        if gt_classes[i] == pred_classes[i]
            && mask::is_empty_mask(&gt_pairs)
            && mask::is_empty_mask(&pred_pairs)
        {
            return Err(EvalError::EmptyMask);
        }
        decoded.push((gt_pairs, pred_pairs));
    }

    let ious: Vec<f64> = decoded
        .par_iter()
        .enumerate()
        .map(|(i, (gt_pairs, pred_pairs))| {
            if pred_classes[i] != gt_classes[i] {
                0.0
            } else {
                mask::set_iou(gt_pairs, pred_pairs)
            }
        })
        .collect();

    Ok(EvalRows {
        classes: gt_classes,
        ious,
        public: gt_rows.iter().map(|r| r.public).collect(),
    })
}

/// Arithmetic mean; NaN when the slice is empty, so a no-data average stays
/// visible instead of collapsing to zero.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Reduce per-row IoU into public and private mean scores.
///
/// Each recognized class contributes the mean IoU over its rows in the split;
/// the final score averages across classes.
pub fn aggregate(rows: &EvalRows) -> Scores {
    let mut public_per_class = Vec::with_capacity(CLASSES.len());
    let mut private_per_class = Vec::with_capacity(CLASSES.len());

    for &(_, code) in CLASSES {
        let split = |want_public: bool| -> Vec<f64> {
            rows.ious
                .iter()
                .zip(&rows.classes)
                .zip(&rows.public)
                .filter(|&((_, &class), &public)| class == code && public == want_public)
                .map(|((&iou, _), _)| iou)
                .collect()
        };
        public_per_class.push(mean(&split(true)));
        private_per_class.push(mean(&split(false)));
    }

    Scores {
        public: mean(&public_per_class),
        private: mean(&private_per_class),
    }
}

/// Score a prediction file against ground truth: load, validate, aggregate.
pub fn evaluate(gt_path: &Path, pred_path: &Path) -> Result<Scores, EvalError> {
    let rows = load_result(gt_path, pred_path)?;
    Ok(aggregate(&rows))
}
