//! Metadata removal: catalog XMP stream, XMP packet properties and the legacy Info record

pub mod info_cleaner;
pub mod metadata_cleaner;
pub mod xmp_cleaner;

pub use info_cleaner::InfoCleaner;
pub use metadata_cleaner::{MetadataCleaner, ScrubStats};
pub use xmp_cleaner::{XmpCleaner, XmpPacket};
