//! Aggregated policy query
//!
//! Groups stored policies by holder and reports a count plus the summed
//! policy amount per user.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::{self, PolicyAggregateRow};

/// Query for the per-user policy aggregation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatePoliciesQuery {}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatePoliciesResponse {
    pub result: Vec<PolicyAggregateRow>,
}

/// Error type for the aggregation query
#[derive(Debug, thiserror::Error)]
pub enum AggregatePoliciesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<db::DbError> for AggregatePoliciesError {
    fn from(err: db::DbError) -> Self {
        match err {
            db::DbError::Sqlx(e) => AggregatePoliciesError::Database(e),
            // The aggregation query never reports a missing row.
            db::DbError::NotFound(_) => AggregatePoliciesError::Database(sqlx::Error::RowNotFound),
        }
    }
}

impl Request<Result<AggregatePoliciesResponse, AggregatePoliciesError>> for AggregatePoliciesQuery {}

impl crate::cqrs::middleware::Query for AggregatePoliciesQuery {}

#[tracing::instrument(skip(pool, _query))]
pub async fn handle(
    pool: PgPool,
    _query: AggregatePoliciesQuery,
) -> Result<AggregatePoliciesResponse, AggregatePoliciesError> {
    let result = db::aggregate_policies_by_user(&pool).await?;

    tracing::debug!(groups = result.len(), "policy aggregation computed");

    Ok(AggregatePoliciesResponse { result })
}
