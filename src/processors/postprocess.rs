//! Classification output post-processing.
//!
//! Helpers that turn a raw classifier output row into probabilities and
//! labeled class maps.

use std::collections::BTreeMap;

/// Applies a numerically stable softmax to a slice of logits.
///
/// Returns an empty vector for empty input.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Returns the index of the largest value, or `None` for empty input.
///
/// Ties are broken by encounter order: the first maximum wins.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Builds a label -> probability map from a probability row.
///
/// Labels beyond the row length are ignored; probabilities beyond the label
/// list fall back to a `class_{index}` name so no probability mass is
/// silently dropped.
pub fn class_probability_map(labels: &[String], probabilities: &[f32]) -> BTreeMap<String, f32> {
    probabilities
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let label = labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("class_{i}"));
            (label, p)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 4.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[3] > probs[2] && probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[1.0, 2.0, 3.0]);
        let b = softmax(&[1001.0, 1002.0, 1003.0]);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_argmax_first_maximum_wins() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_class_probability_map_uses_fallback_names() {
        let labels = vec!["glioma".to_string()];
        let map = class_probability_map(&labels, &[0.7, 0.3]);
        assert_eq!(map["glioma"], 0.7);
        assert_eq!(map["class_1"], 0.3);
    }
}
