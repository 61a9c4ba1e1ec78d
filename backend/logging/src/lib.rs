//! Logging setup for the Reframe backend.

pub mod logger;

pub use logger::init;
