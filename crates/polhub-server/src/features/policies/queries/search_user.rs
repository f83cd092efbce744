//! Search user query
//!
//! Looks up one policy holder by first name and returns the user together
//! with every policy filed against them.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::{self, PolicyInfoRow, UserRow};

/// Query to find a user and their policies by first name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchUserQuery {
    pub username: String,
}

/// A user with their policies attached
#[derive(Debug, Clone, Serialize)]
pub struct SearchUserResponse {
    pub user: UserRow,
    pub policy_info: Vec<PolicyInfoRow>,
}

/// Error type for the search user query
#[derive(Debug, thiserror::Error)]
pub enum SearchUserError {
    #[error("Username is required and cannot be empty")]
    UsernameRequired,
    #[error("No user found with first name '{0}'")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<db::DbError> for SearchUserError {
    fn from(err: db::DbError) -> Self {
        match err {
            db::DbError::Sqlx(e) => SearchUserError::Database(e),
            db::DbError::NotFound(what) => SearchUserError::NotFound(what),
        }
    }
}

impl Request<Result<SearchUserResponse, SearchUserError>> for SearchUserQuery {}

impl crate::cqrs::middleware::Query for SearchUserQuery {}

impl SearchUserQuery {
    pub fn validate(&self) -> Result<(), SearchUserError> {
        if self.username.trim().is_empty() {
            return Err(SearchUserError::UsernameRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, query), fields(username = %query.username))]
pub async fn handle(
    pool: PgPool,
    query: SearchUserQuery,
) -> Result<SearchUserResponse, SearchUserError> {
    query.validate()?;

    let user = db::find_user_by_first_name(&pool, &query.username)
        .await?
        .ok_or_else(|| SearchUserError::NotFound(query.username.clone()))?;

    let policy_info = db::policies_for_user(&pool, user.id).await?;

    tracing::debug!(
        user_id = %user.id,
        policies = policy_info.len(),
        "user search resolved"
    );

    Ok(SearchUserResponse { user, policy_info })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rejects_blank_username() {
        let query = SearchUserQuery {
            username: "  ".to_string(),
        };
        assert!(matches!(query.validate(), Err(SearchUserError::UsernameRequired)));
    }

    #[test]
    fn test_validation_accepts_name() {
        let query = SearchUserQuery {
            username: "Alice".to_string(),
        };
        assert!(query.validate().is_ok());
    }
}
