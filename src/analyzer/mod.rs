//! Document analysis

pub mod property_inspector;

pub use property_inspector::PropertyInspector;
