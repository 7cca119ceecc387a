//! Tweetline Core - Common infrastructure for the tweet extraction pipeline
//!
//! This crate provides the pieces shared by the extraction crate and the
//! CLI: the HTTP facade, the row-to-Arrow accumulation trait, Parquet
//! persistence, logging and progress reporting.

pub mod api;
pub mod logging;
pub mod progress;
pub mod sink;
pub mod table;

// Re-exports for convenience
pub use api::{ApiError, ApiResponse, SHARED_RUNTIME, http_client};
pub use logging::init_logging;
pub use progress::ProgressContext;
pub use sink::write_table;
pub use table::Accumulator;
