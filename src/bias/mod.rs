//! Bias module - fairness metrics and mitigation transforms
//!
//! Every function here is a pure transform over an in-memory `DataFrame`:
//! no I/O, no shared state, and the caller's frame is never modified.

pub mod adjust;
pub mod config;
pub mod error;
pub mod label;
pub mod mitigate;
pub mod report;
pub mod resample;
pub mod reweigh;
pub mod values;

pub use adjust::*;
pub use config::*;
pub use error::*;
pub use label::*;
pub use mitigate::*;
pub use report::*;
pub use resample::*;
pub use reweigh::*;
pub use values::Label;
