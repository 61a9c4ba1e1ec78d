//! `reframe-gateway` — the HTTP boundary of the Reframe backend.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{AppState, build_router, start_server};
