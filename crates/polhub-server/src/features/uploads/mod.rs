pub mod commands;
pub mod routes;

pub use commands::{IngestFileCommand, IngestFileError, IngestFileResponse};
