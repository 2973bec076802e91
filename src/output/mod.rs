//! Output generation

pub mod output_generator;

pub use output_generator::{OutputGenerator, PersistOutcome};
