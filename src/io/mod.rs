//! Dataset I/O - loading inputs and writing mitigated outputs

pub mod loader;
pub mod writer;

pub use loader::*;
pub use writer::*;
