//! Ingestion coordinator
//!
//! Dispatches one fresh isolated worker per upload, awaits its single
//! result message, and persists the six batches. Concurrency is bounded by
//! a semaphore sized from configuration; requests beyond the bound queue on
//! permit acquisition.

use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::info;

use crate::db::records::{persist_batches, PersistedCounts};

use super::worker::{self, IngestError};

/// Coordinator-level failures for one ingestion request.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Worker-side failure; no persistence was attempted.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A bulk insert failed. Collections inserted earlier in the sequence
    /// stay written; there is no compensating rollback.
    #[error("Failed to persist record batches: {0}")]
    Persistence(#[from] crate::db::DbError),
}

/// Outcome of a successful ingestion request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestReceipt {
    pub rows: usize,
    pub persisted: PersistedCounts,
}

/// Coordinates upload ingestion against the record store.
#[derive(Clone)]
pub struct IngestCoordinator {
    pool: PgPool,
    permits: Arc<Semaphore>,
}

impl IngestCoordinator {
    pub fn new(pool: PgPool, max_concurrent_workers: usize) -> Self {
        Self {
            pool,
            permits: Arc::new(Semaphore::new(max_concurrent_workers)),
        }
    }

    /// Run one upload through parse, normalize, and persist.
    ///
    /// The six bulk inserts run sequentially in a fixed order (agents,
    /// users, accounts, categories, carriers, policy infos) and are not
    /// wrapped in a cross-collection transaction.
    #[tracing::instrument(skip(self, file_buffer), fields(filename = %original_filename, bytes = file_buffer.len()))]
    pub async fn ingest(
        &self,
        file_buffer: Vec<u8>,
        original_filename: String,
    ) -> Result<IngestReceipt, CoordinatorError> {
        // Closed only on drop of the coordinator itself, so acquire cannot
        // fail while a request holds a clone.
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| IngestError::WorkerCrashed)?;

        let batches = worker::run(file_buffer, original_filename).await?;
        let rows = batches.row_count();

        let persisted = persist_batches(&self.pool, &batches).await?;

        info!(rows, "upload ingested");
        Ok(IngestReceipt { rows, persisted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_errors_are_distinguishable() {
        let ingest: CoordinatorError = IngestError::UnsupportedFormat("txt".into()).into();
        assert!(matches!(
            ingest,
            CoordinatorError::Ingest(IngestError::UnsupportedFormat(_))
        ));

        let crash: CoordinatorError = IngestError::WorkerCrashed.into();
        assert!(matches!(
            crash,
            CoordinatorError::Ingest(IngestError::WorkerCrashed)
        ));
    }
}
