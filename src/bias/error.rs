//! Error types for bias analysis and mitigation.
//!
//! Configuration problems (unknown columns, missing arguments, wrong column
//! types) fail fast with a `BiasError`. Statistically degenerate but
//! structurally valid input is reported through warnings instead, except
//! where a transform cannot produce anything meaningful at all.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the report and mitigation engines.
#[derive(Debug, Error)]
pub enum BiasError {
    /// A sensitive, target or score column is absent from the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A required parameter is missing or a name is not recognised.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A column cannot be interpreted as numeric for a numeric transform.
    #[error("Column '{column}' must be numeric: {detail}")]
    TypeMismatch {
        /// Column that failed the numeric conversion
        column: String,
        /// What was found instead
        detail: String,
    },

    /// The input cannot support the requested transform at all.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Failure inside polars while reading or building columns.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Result alias for the bias engines.
pub type Result<T> = std::result::Result<T, BiasError>;
