//! Text extraction from uploaded prescription images

/// Environment configuration
pub mod config;

/// Tesseract invocation
pub mod engine;

/// Lambda event handler
pub mod handler;

/// Image preprocessing pipeline
pub mod preprocess;

pub use config::OcrConfig;
pub use engine::{Tesseract, TextRecognizer};
pub use handler::OcrHandler;
pub use preprocess::{preprocess, PreprocessOptions};
