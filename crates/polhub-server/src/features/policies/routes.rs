use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::queries::{
    AggregatePoliciesError, AggregatePoliciesQuery, SearchUserError, SearchUserQuery,
};

pub fn policies_routes() -> Router<PgPool> {
    Router::new()
        .route("/search/:username", get(search_user))
        .route("/aggregated-policy", get(aggregated_policy))
}

#[tracing::instrument(skip(pool), fields(username = %username))]
async fn search_user(
    State(pool): State<PgPool>,
    Path(username): Path<String>,
) -> Result<Response, PolicyApiError> {
    let query = SearchUserQuery { username };
    let response = super::queries::search_user::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn aggregated_policy(State(pool): State<PgPool>) -> Result<Response, PolicyApiError> {
    let response =
        super::queries::aggregate_policies::handle(pool, AggregatePoliciesQuery::default()).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum PolicyApiError {
    Search(SearchUserError),
    Aggregate(AggregatePoliciesError),
}

impl From<SearchUserError> for PolicyApiError {
    fn from(err: SearchUserError) -> Self {
        Self::Search(err)
    }
}

impl From<AggregatePoliciesError> for PolicyApiError {
    fn from(err: AggregatePoliciesError) -> Self {
        Self::Aggregate(err)
    }
}

impl IntoResponse for PolicyApiError {
    fn into_response(self) -> Response {
        match self {
            PolicyApiError::Search(err @ SearchUserError::UsernameRequired) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", err.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            PolicyApiError::Search(err @ SearchUserError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", err.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            PolicyApiError::Search(SearchUserError::Database(e)) => {
                tracing::error!("Database error during user search: {}", e);
                let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            PolicyApiError::Aggregate(AggregatePoliciesError::Database(e)) => {
                tracing::error!("Database error during policy aggregation: {}", e);
                let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
