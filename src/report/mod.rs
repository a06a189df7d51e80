//! Report module - rendering and exporting bias results

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
