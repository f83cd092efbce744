//! Feature modules implementing the polhub API
//!
//! This module contains all feature slices following the CQRS (Command Query
//! Responsibility Segregation) pattern. Each feature is organized as a
//! vertical slice with its own commands, queries, and routes.
//!
//! # Features
//!
//! - **uploads**: Multipart spreadsheet ingestion into the record store
//! - **policies**: User search and per-user policy aggregation
//! - **messages**: Scheduled message storage
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//!
//! Commands and queries implement the mediator pattern using the `mediator`
//! crate, enabling clean separation of concerns and easy testing.

pub mod messages;
pub mod policies;
pub mod uploads;

use axum::Router;

use crate::ingest::IngestCoordinator;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
    /// Bounded-concurrency ingestion pipeline for upload handling
    pub coordinator: IngestCoordinator,
}

/// Creates the main API router with all feature routes mounted
///
/// Routes live at the root of the server rather than under a versioned
/// prefix:
/// - `POST /uploadfile` - Spreadsheet ingestion
/// - `GET /search/:username` - User and policy lookup
/// - `GET /aggregated-policy` - Per-user policy aggregation
/// - `POST /schedule-message` - Scheduled message storage
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .merge(uploads::routes::uploads_routes().with_state(state.coordinator.clone()))
        .merge(policies::routes::policies_routes().with_state(state.db.clone()))
        .merge(messages::routes::messages_routes().with_state(state.db.clone()))
}
