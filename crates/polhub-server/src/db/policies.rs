//! Policy lookup and aggregation queries

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbResult;

/// A stored policy holder.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub user_type: Option<String>,
}

/// A stored policy, refs carried verbatim from ingestion.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PolicyInfoRow {
    pub id: Uuid,
    pub policy_number: Option<String>,
    pub policy_start_date: Option<NaiveDate>,
    pub policy_end_date: Option<NaiveDate>,
    pub policy_category_ref: Option<String>,
    pub account_ref: Option<String>,
    pub carrier_ref: Option<String>,
    pub user_ref: Option<String>,
}

/// Per-user aggregation over `policy_infos`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PolicyAggregateRow {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub policy_count: i64,
    pub total_policy_amount: f64,
}

/// Find one user by first name, case-insensitive.
pub async fn find_user_by_first_name(pool: &PgPool, first_name: &str) -> DbResult<Option<UserRow>> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, first_name, date_of_birth, address, phone_number,
               state, zip_code, email, gender, user_type
        FROM users
        WHERE LOWER(first_name) = LOWER($1)
        LIMIT 1
        "#,
    )
    .bind(first_name)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Policies whose verbatim `user_ref` points at the given user.
pub async fn policies_for_user(pool: &PgPool, user_id: Uuid) -> DbResult<Vec<PolicyInfoRow>> {
    let policies = sqlx::query_as::<_, PolicyInfoRow>(
        r#"
        SELECT id, policy_number, policy_start_date, policy_end_date,
               policy_category_ref, account_ref, carrier_ref, user_ref
        FROM policy_infos
        WHERE user_ref = $1::text
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(policies)
}

/// Group policies by their `user_ref` and join the matching users: count per
/// user plus the summed policy amount (0 when never populated). Policies
/// whose ref resolves to no stored user are dropped, matching an inner join.
pub async fn aggregate_policies_by_user(pool: &PgPool) -> DbResult<Vec<PolicyAggregateRow>> {
    let rows = sqlx::query_as::<_, PolicyAggregateRow>(
        r#"
        SELECT u.id AS user_id,
               u.first_name AS user_name,
               COUNT(p.id) AS policy_count,
               COALESCE(SUM(p.policy_amount), 0)::double precision AS total_policy_amount
        FROM policy_infos p
        JOIN users u ON u.id::text = p.user_ref
        GROUP BY u.id, u.first_name
        ORDER BY policy_count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
