//! Positive-label inference for target columns
//!
//! When the caller does not name the favourable outcome, it is guessed from
//! the target values. The guess is a heuristic: binary 0/1 targets resolve to
//! `1`, other binary targets to their larger value, and everything else to
//! the most frequent value. Callers that need a specific label should pass it
//! explicitly.

use std::collections::HashMap;

use super::values::{same_kind, Label};

/// Infer the positive label of a target column.
///
/// Returns `None` when the column holds no non-missing values, which callers
/// treat as "undetermined".
pub fn infer_positive_label(values: &[Option<Label>]) -> Option<Label> {
    // Distinct values in first-appearance order, with counts
    let mut distinct: Vec<Label> = Vec::new();
    let mut counts: HashMap<&Label, usize> = HashMap::new();
    for value in values.iter().flatten() {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            distinct.push(value.clone());
        }
        *count += 1;
    }

    match distinct.len() {
        0 => None,
        2 => {
            let (first, second) = (&distinct[0], &distinct[1]);
            let zero = Label::Number(0.0);
            let one = Label::Number(1.0);
            if (*first == zero && *second == one) || (*first == one && *second == zero) {
                return Some(one);
            }
            if !same_kind(first, second) {
                return Some(first.clone());
            }
            Some(first.max(second).clone())
        }
        _ => {
            // Mode, earliest value wins ties
            let mut best: Option<(&Label, usize)> = None;
            for value in &distinct {
                let count = counts.get(value).copied().unwrap_or(0);
                if best.map_or(true, |(_, c)| count > c) {
                    best = Some((value, count));
                }
            }
            best.map(|(label, _)| label.clone())
        }
    }
}

/// Resolve the positive label: the explicit one if given, otherwise inferred.
pub fn resolve_positive_label(
    explicit: Option<&Label>,
    values: &[Option<Label>],
) -> Option<Label> {
    match explicit {
        Some(label) => Some(label.clone()),
        None => infer_positive_label(values),
    }
}

/// Mark each row as positive when its value matches the positive label.
pub fn positive_mask(values: &[Option<Label>], positive: &Label) -> Vec<bool> {
    values
        .iter()
        .map(|v| v.as_ref().is_some_and(|label| label.matches(positive)))
        .collect()
}
