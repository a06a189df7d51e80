//! Cell values and column access
//!
//! The engines work on dataset columns as plain vectors of cell values.
//! This module reads polars columns into those vectors and writes derived
//! vectors back as columns, keeping the original column type where it can.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{BiasError, Result};

/// Display name used for rows whose key value is missing
pub const MISSING_KEY: &str = "null";

/// A non-missing scalar cell value.
///
/// Numbers order before text; numbers compare numerically and text
/// lexicographically. `-0.0` and `0.0` are the same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Number(f64),
    Text(String),
}

impl Label {
    /// Parse user input: anything that reads as a finite number becomes
    /// `Number`, everything else stays `Text`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Label::Number(n),
            _ => Label::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Label::Number(n) => Some(*n),
            Label::Text(_) => None,
        }
    }

    /// Loose equality used when comparing a caller-supplied label with
    /// dataset cells: text that parses to the same number matches.
    pub fn matches(&self, other: &Label) -> bool {
        match (self, other) {
            (Label::Number(n), Label::Text(s)) | (Label::Text(s), Label::Number(n)) => s
                .trim()
                .parse::<f64>()
                .map(|parsed| parsed == *n)
                .unwrap_or(false),
            _ => self == other,
        }
    }

    fn is_same_kind(&self, other: &Label) -> bool {
        matches!(
            (self, other),
            (Label::Number(_), Label::Number(_)) | (Label::Text(_), Label::Text(_))
        )
    }
}

/// Canonical bits for hashing and ordering
fn normalized(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else {
        n
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Label::Number(n) => {
                0u8.hash(state);
                normalized(*n).to_bits().hash(state);
            }
            Label::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Label::Number(a), Label::Number(b)) => normalized(*a).total_cmp(&normalized(*b)),
            (Label::Number(_), Label::Text(_)) => Ordering::Less,
            (Label::Text(_), Label::Number(_)) => Ordering::Greater,
            (Label::Text(a), Label::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Label::Number(n) => write!(f, "{}", n),
            Label::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Text(value.to_string())
    }
}

impl From<f64> for Label {
    fn from(value: f64) -> Self {
        Label::Number(value)
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Number(value as f64)
    }
}

/// Whether two labels share a kind (both numbers or both text).
pub(crate) fn same_kind(a: &Label, b: &Label) -> bool {
    a.is_same_kind(b)
}

/// Display form of an optional key, `null` for missing
pub fn key_name(key: &Option<Label>) -> String {
    match key {
        Some(label) => label.to_string(),
        None => MISSING_KEY.to_string(),
    }
}

/// Look up a column, mapping absence to `ColumnNotFound`.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| BiasError::ColumnNotFound(name.to_string()))
}

/// Read a column as optional labels, one per row.
///
/// Numeric columns become `Number` (NaN counts as missing), booleans become
/// `"true"`/`"false"`, strings stay text and any other type is cast to string.
pub fn column_labels(df: &DataFrame, name: &str) -> Result<Vec<Option<Label>>> {
    let column = require_column(df, name)?;

    let labels: Vec<Option<Label>> = match column.dtype() {
        dtype if dtype.is_primitive_numeric() => {
            let cast = column.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|n| !n.is_nan()).map(Label::Number))
                .collect()
        }
        DataType::Boolean => column
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| Label::Text(b.to_string())))
            .collect(),
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.map(|s| Label::Text(s.to_string())))
            .collect(),
        _ => {
            let cast = column.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| Label::Text(s.to_string())))
                .collect()
        }
    };

    Ok(labels)
}

/// Read a column as optional floats for numeric transforms.
///
/// Numeric text is parsed; any other text fails with `TypeMismatch`.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?;

    match column.dtype() {
        dtype if dtype.is_primitive_numeric() => {
            let cast = column.cast(&DataType::Float64)?;
            Ok(cast
                .f64()?
                .into_iter()
                .map(|v| v.filter(|n| !n.is_nan()))
                .collect())
        }
        DataType::Boolean => Ok(column
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
            .collect()),
        DataType::String => {
            let mut values = Vec::with_capacity(column.len());
            for (row, cell) in column.str()?.into_iter().enumerate() {
                let parsed = match cell {
                    None => None,
                    Some(s) if s.trim().is_empty() => None,
                    Some(s) => Some(s.trim().parse::<f64>().map_err(|_| {
                        BiasError::TypeMismatch {
                            column: name.to_string(),
                            detail: format!("value '{}' at row {}", s, row),
                        }
                    })?),
                };
                values.push(parsed.filter(|n| !n.is_nan()));
            }
            Ok(values)
        }
        other => Err(BiasError::TypeMismatch {
            column: name.to_string(),
            detail: format!("unsupported column type {}", other),
        }),
    }
}

fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Build a column from labels, keeping the type of `like` where the values
/// allow it: integer columns stay integer, boolean columns stay boolean.
pub fn labels_to_series(name: &str, values: &[Option<Label>], like: &DataType) -> Series {
    let all_numeric = values
        .iter()
        .flatten()
        .all(|v| matches!(v, Label::Number(_)));

    if all_numeric {
        let numbers = values.iter().map(|v| v.as_ref().and_then(Label::as_number));
        if is_integer_dtype(like) {
            let ints: Vec<Option<i64>> = numbers.map(|v| v.map(|n| n.round() as i64)).collect();
            return Series::new(name.into(), ints);
        }
        let floats: Vec<Option<f64>> = numbers.collect();
        return Series::new(name.into(), floats);
    }

    if *like == DataType::Boolean {
        let bools: Option<Vec<Option<bool>>> = values
            .iter()
            .map(|v| match v {
                None => Some(None),
                Some(Label::Text(s)) if s == "true" => Some(Some(true)),
                Some(Label::Text(s)) if s == "false" => Some(Some(false)),
                Some(_) => None,
            })
            .collect();
        if let Some(bools) = bools {
            return Series::new(name.into(), bools);
        }
    }

    let strings: Vec<Option<String>> = values
        .iter()
        .map(|v| v.as_ref().map(|l| l.to_string()))
        .collect();
    Series::new(name.into(), strings)
}

/// Partition row indices by key, keeping keys in first-appearance order and
/// rows in their original order within each key.
pub fn partition<K: Eq + Hash + Clone>(keys: &[K]) -> Vec<(K, Vec<usize>)> {
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<usize>)> = Vec::new();

    for (row, key) in keys.iter().enumerate() {
        match slots.get(key) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key.clone(), vec![row]));
            }
        }
    }

    groups
}

/// Order optional keys ascending with missing last
pub fn compare_keys(a: &Option<Label>, b: &Option<Label>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Round to 6 decimal places, the precision of every reported float
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
