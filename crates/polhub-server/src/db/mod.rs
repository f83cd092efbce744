//! Record store access
//!
//! All persistence goes through this module: bulk inserts for the six
//! ingestion collections, the policy lookup/aggregation queries, and the
//! scheduled message insert. Schema lives in the workspace `migrations/`
//! directory and is applied at startup.

use thiserror::Error;

pub mod messages;
pub mod policies;
pub mod records;

pub use messages::insert_scheduled_message;
pub use policies::{
    aggregate_policies_by_user, find_user_by_first_name, policies_for_user, PolicyAggregateRow,
    PolicyInfoRow, UserRow,
};
pub use records::{persist_batches, PersistedCounts};

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),
}

impl DbError {
    /// Create a not found error with resource context
    pub fn not_found(resource_type: &str, identifier: &str) -> Self {
        Self::NotFound(format!("{} '{}' not found", resource_type, identifier))
    }
}

pub type DbResult<T> = Result<T, DbError>;
