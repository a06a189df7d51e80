//! Bias Buster: Group Fairness Library
//!
//! Measures how outcomes differ across the groups of a sensitive attribute
//! in a tabular dataset, and produces mitigated copies of the data by
//! reweighing, resampling or adjusting the target.

pub mod bias;
pub mod cli;
pub mod io;
pub mod report;
pub mod utils;
