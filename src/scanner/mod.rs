//! Input discovery

pub mod pdf_scanner;

pub use pdf_scanner::PdfScanner;
