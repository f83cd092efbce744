use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sqlx::PgPool;

use super::commands::{ScheduleMessageCommand, ScheduleMessageError};

pub fn messages_routes() -> Router<PgPool> {
    Router::new().route("/schedule-message", post(schedule_message))
}

#[tracing::instrument(skip(pool, command))]
async fn schedule_message(
    State(pool): State<PgPool>,
    Json(command): Json<ScheduleMessageCommand>,
) -> Result<Response, MessageApiError> {
    let response = super::commands::schedule::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
struct MessageApiError(ScheduleMessageError);

impl From<ScheduleMessageError> for MessageApiError {
    fn from(err: ScheduleMessageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MessageApiError {
    fn into_response(self) -> Response {
        match self.0 {
            err @ ScheduleMessageError::MessageRequired => {
                let error = ErrorResponse::new("VALIDATION_ERROR", err.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            err @ ScheduleMessageError::InvalidDateTime(_) => {
                let error = ErrorResponse::new("INVALID_DATETIME", err.to_string());
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
            },
            ScheduleMessageError::Database(e) => {
                tracing::error!("Database error scheduling message: {}", e);
                let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
