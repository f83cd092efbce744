//! Isolated ingestion worker
//!
//! Parsing and normalization run inside a dedicated blocking task, a fault
//! domain separate from the caller. A panic in there is caught at the join
//! boundary and surfaced as [`IngestError::WorkerCrashed`]; the coordinator
//! only ever sees a typed result, never an unwinding stack.

use thiserror::Error;
use tracing::warn;

use super::normalize::normalize;
use super::parser::{self, ParseError};
use super::types::RecordBatches;

/// Worker-side failures, all distinguishable from a zero-row success.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Failed to parse file: {0}")]
    Parse(String),

    #[error("Ingestion worker terminated abnormally")]
    WorkerCrashed,
}

impl From<ParseError> for IngestError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedFormat(ext) => IngestError::UnsupportedFormat(ext),
            other => IngestError::Parse(other.to_string()),
        }
    }
}

/// Parse an uploaded file buffer and normalize every row into the six
/// batches, inside an isolated execution unit.
///
/// The worker owns the buffer and filename exclusively; the single message
/// crossing the isolation boundary is the returned result.
pub async fn run(
    file_buffer: Vec<u8>,
    original_filename: String,
) -> Result<RecordBatches, IngestError> {
    run_isolated(move || process(&file_buffer, &original_filename)).await?
}

/// Execute `work` on the blocking pool and translate an abnormal termination
/// (panic or cancellation) into [`IngestError::WorkerCrashed`].
async fn run_isolated<T, F>(work: F) -> Result<T, IngestError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|join| {
        warn!(error = %join, "ingestion worker terminated abnormally");
        IngestError::WorkerCrashed
    })
}

/// The worker body: extension dispatch, parse, normalize, package.
fn process(file_buffer: &[u8], original_filename: &str) -> Result<RecordBatches, IngestError> {
    let extension = file_extension(original_filename);
    let rows = parser::parse(file_buffer, &extension)?;

    let mut batches = RecordBatches::new();
    for row in &rows {
        batches.push(normalize(row));
    }

    Ok(batches)
}

/// Substring after the final `.`, lowercased. A filename without a dot has
/// an empty (unsupported) extension.
fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::xlsx::tests::build_xlsx;

    #[tokio::test]
    async fn test_run_csv_end_to_end() {
        let buffer = b"firstname,agent,policy_number\nAlice,Bob,P100\n".to_vec();

        let batches = run(buffer, "policies.csv".to_string()).await.unwrap();

        assert_eq!(batches.row_count(), 1);
        assert_eq!(batches.users[0].first_name.as_deref(), Some("Alice"));
        assert_eq!(batches.agents[0].agent_name.as_deref(), Some("Bob"));
        assert_eq!(batches.policy_infos[0].policy_number.as_deref(), Some("P100"));
    }

    #[tokio::test]
    async fn test_run_xlsx_end_to_end() {
        let buffer = build_xlsx(&[
            &["firstname", "company_name"],
            &["Alice", "Integon Gen Ins Corp"],
            &["Carol", "Travelers"],
        ]);

        let batches = run(buffer, "book.XLSX".to_string()).await.unwrap();

        assert_eq!(batches.row_count(), 2);
        assert_eq!(
            batches.policy_carriers[1].company_name.as_deref(),
            Some("Travelers")
        );
    }

    #[tokio::test]
    async fn test_row_count_invariant() {
        let buffer = b"firstname\nAlice\nBob\nCarol\n".to_vec();

        let batches = run(buffer, "users.csv".to_string()).await.unwrap();

        assert_eq!(batches.row_count(), 3);
        for len in [
            batches.agents.len(),
            batches.users.len(),
            batches.accounts.len(),
            batches.policy_categories.len(),
            batches.policy_carriers.len(),
            batches.policy_infos.len(),
        ] {
            assert_eq!(len, 3);
        }
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let result = run(b"data".to_vec(), "notes.txt".to_string()).await;
        assert!(matches!(result, Err(IngestError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[tokio::test]
    async fn test_filename_without_dot_is_unsupported() {
        let result = run(b"data".to_vec(), "Makefile".to_string()).await;
        assert!(matches!(result, Err(IngestError::UnsupportedFormat(ext)) if ext.is_empty()));
    }

    #[tokio::test]
    async fn test_malformed_xlsx_is_a_parse_failure() {
        let result = run(b"definitely not a zip".to_vec(), "bad.xlsx".to_string()).await;
        assert!(matches!(result, Err(IngestError::Parse(_))));
    }

    #[tokio::test]
    async fn test_panic_inside_worker_is_contained() {
        // A crash in the isolated unit must reach the caller as a typed
        // failure, not an unwinding panic.
        let result: Result<(), IngestError> =
            run_isolated(|| panic!("worker blew up")).await;

        assert!(matches!(result, Err(IngestError::WorkerCrashed)));
    }

    #[tokio::test]
    async fn test_caller_survives_worker_crash() {
        let _ = run_isolated::<(), _>(|| panic!("first crash")).await;

        // Subsequent requests still work.
        let batches = run(
            b"firstname\nAlice\n".to_vec(),
            "after-crash.csv".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(batches.row_count(), 1);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.xlsx"), "xlsx");
        assert_eq!(file_extension("a.b.CSV"), "csv");
        assert_eq!(file_extension("no_extension"), "");
        assert_eq!(file_extension("trailing."), "");
    }
}
