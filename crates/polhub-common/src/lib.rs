//! Polhub Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the polhub workspace.
//!
//! # Overview
//!
//! This crate provides the functionality shared across polhub members:
//!
//! - **Error Handling**: the [`PolhubError`] type and [`Result`] alias
//! - **Logging**: centralized `tracing` initialization driven by environment
//!   variables, with console/file targets and text/JSON formats
//!
//! # Example
//!
//! ```no_run
//! use polhub_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("service starting");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{PolhubError, Result};
