//! `reframe-storage` — flat-file persistence for the Reframe backend.
//!
//! Entry records and the retrieval corpus, the raw full-journal text, and
//! uploaded journal images. All writes take scoped exclusive access to
//! their backing files for the duration of the write.

pub mod entry_store;
pub mod image_store;
pub mod text_store;

pub use entry_store::EntryStore;
pub use image_store::{ImageStore, UploadedImage, has_allowed_extension, sanitize_filename};
pub use text_store::TextStore;
