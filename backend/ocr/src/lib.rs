//! `reframe-ocr` — text extraction from journal images.
//!
//! Bridges the stored journal photos to an Ollama vision model and
//! flattens the per-image results into one running text.

pub mod engine;

pub use engine::OcrEngine;
