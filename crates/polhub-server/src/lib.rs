//! Polhub Server Library
//!
//! HTTP server for ingesting insurance policy spreadsheets.
//!
//! # Overview
//!
//! The server accepts CSV/XLSX uploads, normalizes each row into six typed
//! record batches (agents, users, accounts, policy categories, policy
//! carriers, policy infos), and persists them to PostgreSQL:
//!
//! - **Ingestion Pipeline**: Parsing and normalization isolated from the
//!   request path, with bounded concurrency
//! - **Database Management**: PostgreSQL integration with SQLx
//! - **Restart Supervisor**: Load-sampling watchdog that replaces the
//!   process on sustained overload
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS and request logging
//!
//! # Architecture
//!
//! The HTTP surface follows a **CQRS (Command Query Responsibility
//! Segregation)** layout:
//!
//! - **Commands** (Write Operations): Upload ingestion and message
//!   scheduling, executed via HTTP POST
//! - **Queries** (Read Operations): User search and policy aggregation,
//!   executed via HTTP GET
//!
//! ## Framework Stack
//!
//! - **Axum**: Modern, ergonomic web framework
//! - **SQLx**: PostgreSQL driver and migrations
//! - **Tower**: Middleware and service abstractions

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod supervisor;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
