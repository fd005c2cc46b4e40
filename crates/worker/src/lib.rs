//! `retention-worker` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod extender;
pub mod pipeline;

pub use error::RetentionError;
