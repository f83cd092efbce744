//! Upload ingestion pipeline
//!
//! An uploaded tabular file moves through: extension dispatch and decoding
//! ([`parser`], [`xlsx`]), row normalization into six typed partial records
//! ([`normalize`]), an isolated execution unit that contains parsing faults
//! ([`worker`]), and a coordinator that bounds concurrency and persists the
//! batches ([`coordinator`]).

pub mod coordinator;
pub mod normalize;
pub mod parser;
pub mod types;
pub mod worker;
mod xlsx;

// Re-export commonly used types
pub use coordinator::{CoordinatorError, IngestCoordinator, IngestReceipt};
pub use parser::ParseError;
pub use types::{NormalizedRow, RawRow, RecordBatches};
pub use worker::IngestError;
