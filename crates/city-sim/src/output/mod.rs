//! Output Generation
//!
//! Per-tick metrics log and end-of-run statistics.

pub mod logger;
pub mod stats;

pub use logger::*;
pub use stats::*;

/// Errors that can occur while writing run output.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
