use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::PersistedCounts;
use crate::ingest::{CoordinatorError, IngestCoordinator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFileCommand {
    pub filename: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFileResponse {
    pub filename: String,
    pub rows: usize,
    #[serde(skip_deserializing)]
    pub persisted: PersistedCounts,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestFileError {
    #[error("A file field is required in the multipart body")]
    FileRequired,
    #[error("Uploaded file must have a filename")]
    FilenameRequired,
    #[error(transparent)]
    Pipeline(#[from] CoordinatorError),
}

impl Request<Result<IngestFileResponse, IngestFileError>> for IngestFileCommand {}

impl crate::cqrs::middleware::Command for IngestFileCommand {}

impl IngestFileCommand {
    /// An empty attached file is valid: it parses to zero rows and
    /// persists nothing. Only a missing multipart field is `FileRequired`,
    /// raised by the route before a command exists.
    pub fn validate(&self) -> Result<(), IngestFileError> {
        if self.filename.trim().is_empty() {
            return Err(IngestFileError::FilenameRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(coordinator, command), fields(filename = %command.filename))]
pub async fn handle(
    coordinator: IngestCoordinator,
    command: IngestFileCommand,
) -> Result<IngestFileResponse, IngestFileError> {
    command.validate()?;
    let IngestFileCommand { filename, content } = command;

    let receipt = coordinator.ingest(content, filename.clone()).await?;

    tracing::info!(rows = receipt.rows, "upload ingested via API");

    Ok(IngestFileResponse {
        filename,
        rows: receipt.rows,
        persisted: receipt.persisted,
    })
}
