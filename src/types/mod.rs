// Type definitions shared across the normalization pipeline

pub mod common;
pub mod snapshot;

pub use common::*;
pub use snapshot::*;
