//! Run-length segment decoding and IoU over decoded pixel sets.
//!
//! A mask is encoded as alternating (start, length) pairs over the flat
//! row-major 512*512 pixel index space, serialized as a string of
//! space-separated non-negative integers, e.g. `"0 4 10 5"` for pixels
//! 0..4 and 10..15.

use crate::error::EvalError;
use crate::types::MAX_PIXEL;

/// Parse a run-length string into its flat integer counts.
pub fn parse_counts(encoded: &str) -> Result<Vec<u32>, EvalError> {
    encoded
        .split_whitespace()
        .map(|tok| {
            tok.parse::<u32>()
                .map_err(|_| EvalError::Format(format!("invalid value {tok:?}")))
        })
        .collect()
}

/// Split a flat count sequence into (start, length) pairs.
pub fn pairs(counts: &[u32]) -> Result<Vec<(u32, u32)>, EvalError> {
    if counts.len() % 2 != 0 {
        return Err(EvalError::Format(
            "contains odd number of values".to_string(),
        ));
    }
    Ok(counts.chunks_exact(2).map(|c| (c[0], c[1])).collect())
}

/// Reject a pair sequence whose last segment runs past the pixel grid.
///
/// Only the final segment is checked; encodings are expected to be sorted,
/// so the last segment carries the maximum pixel index.
pub fn validate_extent(pairs: &[(u32, u32)]) -> Result<(), EvalError> {
    if let Some(&(start, len)) = pairs.last() {
        if start as u64 + len as u64 > MAX_PIXEL as u64 {
            return Err(EvalError::Bounds);
        }
    }
    Ok(())
}

/// True if every segment has zero length, i.e. the mask covers no pixels.
pub fn is_empty_mask(pairs: &[(u32, u32)]) -> bool {
    pairs.iter().all(|&(_, len)| len == 0)
}

/// Expand (start, length) pairs into the sorted set of covered pixel indices.
///
/// Overlapping segments collapse: each pixel appears at most once.
pub fn expand(pairs: &[(u32, u32)]) -> Vec<u32> {
    let mut pixels: Vec<u32> =
        Vec::with_capacity(pairs.iter().map(|&(_, len)| len as usize).sum());
    for &(start, len) in pairs {
        pixels.extend(start..start + len);
    }
    pixels.sort_unstable();
    pixels.dedup();
    pixels
}

/// Count elements common to two sorted deduplicated index sets.
fn intersection_size(a: &[u32], b: &[u32]) -> usize {
    let mut i = 0;
    let mut j = 0;
    let mut count = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// IoU of two decoded pair sequences: |A ∩ B| / |A ∪ B| over the expanded
/// pixel sets. The caller guarantees the union is non-empty.
pub(crate) fn set_iou(gt: &[(u32, u32)], pred: &[(u32, u32)]) -> f64 {
    let a = expand(gt);
    let b = expand(pred);
    let inter = intersection_size(&a, &b);
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}

/// Compute IoU between a ground-truth and a predicted run-length sequence.
///
/// The predicted sequence must hold an even number of values and stay inside
/// the pixel grid; ground truth is trusted as validated upstream and is not
/// bounds-checked. A class mismatch scores 0 without decoding either side.
/// A row where both masks decode to zero pixels has no defined IoU and is
/// rejected.
pub fn iou(gt: &[u32], pred: &[u32], gt_class: u32, pred_class: u32) -> Result<f64, EvalError> {
    let pred_pairs = pairs(pred)?;
    validate_extent(&pred_pairs)?;

    if pred_class != gt_class {
        return Ok(0.0);
    }

    let gt_pairs = pairs(gt)?;
    if is_empty_mask(&gt_pairs) && is_empty_mask(&pred_pairs) {
        return Err(EvalError::EmptyMask);
    }
    Ok(set_iou(&gt_pairs, &pred_pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts() {
        assert_eq!(parse_counts("0 4 10 5").unwrap(), vec![0, 4, 10, 5]);
    }

    #[test]
    fn test_parse_counts_bad_token() {
        let err = parse_counts("0 4 x 5").unwrap_err();
        assert!(matches!(err, EvalError::Format(_)));
    }

    #[test]
    fn test_parse_counts_negative() {
        let err = parse_counts("-1 4").unwrap_err();
        assert!(matches!(err, EvalError::Format(_)));
    }

    #[test]
    fn test_pairs_odd() {
        let err = pairs(&[0, 4, 10]).unwrap_err();
        assert!(matches!(err, EvalError::Format(_)));
    }

    #[test]
    fn test_expand_dedups_overlap() {
        // "0 10 5 10": pixels 0..10 and 5..15 cover 15 distinct indices
        let pixels = expand(&[(0, 10), (5, 10)]);
        assert_eq!(pixels.len(), 15);
        assert_eq!(pixels, (0..15).collect::<Vec<u32>>());
    }

    #[test]
    fn test_expand_deterministic() {
        let counts = parse_counts("22 7 0 4").unwrap();
        let a = expand(&pairs(&counts).unwrap());
        let b = expand(&pairs(&counts).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_iou_identical() {
        let enc = parse_counts("0 4 10 5").unwrap();
        let v = iou(&enc, &enc, 1, 1).unwrap();
        assert_eq!(v, 1.0);
    }

    #[test]
    fn test_iou_disjoint() {
        let v = iou(&[0, 4], &[100, 4], 1, 1).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // gt 0..10, pred 5..15: intersection 5, union 15
        let v = iou(&[0, 10], &[5, 10], 1, 1).unwrap();
        assert!((v - 5.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_iou_class_mismatch() {
        let v = iou(&[0, 4], &[0, 4], 1, 2).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_iou_symmetric() {
        let a = parse_counts("0 10 20 5").unwrap();
        let b = parse_counts("5 10").unwrap();
        let ab = iou(&a, &b, 1, 1).unwrap();
        let ba = iou(&b, &a, 1, 1).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_iou_overlapping_pred_segments() {
        // gt 0..15; pred "0 10 5 10" covers the same 15 pixels after dedup
        let v = iou(&[0, 15], &[0, 10, 5, 10], 1, 1).unwrap();
        assert_eq!(v, 1.0);
    }

    #[test]
    fn test_iou_pred_out_of_bounds() {
        // last segment ends at 262144, one past the grid
        let err = iou(&[0, 4], &[262140, 5], 1, 1).unwrap_err();
        assert!(matches!(err, EvalError::Bounds));
    }

    #[test]
    fn test_iou_pred_at_bound() {
        // last pixel index 262143 is the final valid cell
        let v = iou(&[262140, 4], &[262140, 4], 1, 1).unwrap();
        assert_eq!(v, 1.0);
    }

    #[test]
    fn test_iou_pred_odd() {
        let err = iou(&[0, 4], &[0, 4, 10], 1, 1).unwrap_err();
        assert!(matches!(err, EvalError::Format(_)));
    }

    #[test]
    fn test_iou_gt_extent_not_checked() {
        // ground truth past the grid is accepted as-is
        let v = iou(&[300000, 5], &[0, 5], 1, 1).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_iou_empty_union() {
        let err = iou(&[0, 0], &[5, 0], 1, 1).unwrap_err();
        assert!(matches!(err, EvalError::EmptyMask));
    }

    #[test]
    fn test_iou_empty_masks_class_mismatch() {
        // class mismatch short-circuits before the empty-union check
        let v = iou(&[0, 0], &[5, 0], 1, 2).unwrap();
        assert_eq!(v, 0.0);
    }
}
