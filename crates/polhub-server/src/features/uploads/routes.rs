use crate::api::response::{ApiResponse, ErrorResponse};
use crate::ingest::{CoordinatorError, IngestCoordinator, IngestError};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::commands::{IngestFileCommand, IngestFileError};

pub fn uploads_routes() -> Router<IngestCoordinator> {
    Router::new().route("/uploadfile", post(upload_file))
}

#[tracing::instrument(skip(coordinator, multipart))]
async fn upload_file(
    State(coordinator): State<IngestCoordinator>,
    mut multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let mut content: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadApiError::Multipart(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| UploadApiError::Multipart(e.to_string()))?;
            content = Some(data.to_vec());
        }
    }

    let content = content.ok_or(UploadApiError::Ingest(IngestFileError::FileRequired))?;
    let filename = filename.ok_or(UploadApiError::Ingest(IngestFileError::FilenameRequired))?;

    let command = IngestFileCommand { filename, content };
    let response = super::commands::ingest_file::handle(coordinator, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum UploadApiError {
    Multipart(String),
    Ingest(IngestFileError),
}

impl From<IngestFileError> for UploadApiError {
    fn from(err: IngestFileError) -> Self {
        Self::Ingest(err)
    }
}

impl IntoResponse for UploadApiError {
    fn into_response(self) -> Response {
        match self {
            UploadApiError::Multipart(message) => {
                let error = ErrorResponse::new("BAD_MULTIPART", message);
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Ingest(
                err @ (IngestFileError::FileRequired | IngestFileError::FilenameRequired),
            ) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", err.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Ingest(IngestFileError::Pipeline(CoordinatorError::Ingest(
                err @ IngestError::UnsupportedFormat(_),
            ))) => {
                let error = ErrorResponse::new("UNSUPPORTED_FORMAT", err.to_string());
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
            },
            UploadApiError::Ingest(IngestFileError::Pipeline(err)) => {
                tracing::error!("Ingestion failed: {}", err);
                let error = ErrorResponse::new("INGEST_FAILED", err.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
