//! Bulk inserts for the six ingestion collections
//!
//! Each collection gets one multi-row INSERT built with `QueryBuilder`.
//! The six inserts are issued sequentially in a fixed order (agents, users,
//! accounts, categories, carriers, policy infos) and are independent: there
//! is no cross-collection transaction, so a mid-sequence failure leaves the
//! earlier collections written.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::ingest::types::{
    AccountRecord, AgentRecord, PolicyCarrierRecord, PolicyCategoryRecord, PolicyInfoRecord,
    RecordBatches, UserRecord,
};

use super::DbResult;

/// Rows written per collection by [`persist_batches`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PersistedCounts {
    pub agents: u64,
    pub users: u64,
    pub accounts: u64,
    pub policy_categories: u64,
    pub policy_carriers: u64,
    pub policy_infos: u64,
}

/// Persist all six batches, one bulk insert per collection, in a fixed
/// order: agents, users, accounts, categories, carriers, policy infos.
pub async fn persist_batches(pool: &PgPool, batches: &RecordBatches) -> DbResult<PersistedCounts> {
    Ok(PersistedCounts {
        agents: insert_agents(pool, &batches.agents).await?,
        users: insert_users(pool, &batches.users).await?,
        accounts: insert_accounts(pool, &batches.accounts).await?,
        policy_categories: insert_policy_categories(pool, &batches.policy_categories).await?,
        policy_carriers: insert_policy_carriers(pool, &batches.policy_carriers).await?,
        policy_infos: insert_policy_infos(pool, &batches.policy_infos).await?,
    })
}

pub async fn insert_agents(pool: &PgPool, records: &[AgentRecord]) -> DbResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO agents (id, agent_name) ");
    builder.push_values(records, |mut b, record| {
        b.push_bind(Uuid::new_v4()).push_bind(&record.agent_name);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn insert_users(pool: &PgPool, records: &[UserRecord]) -> DbResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO users (id, first_name, date_of_birth, address, phone_number, \
         state, zip_code, email, gender, user_type) ",
    );
    builder.push_values(records, |mut b, record| {
        b.push_bind(Uuid::new_v4())
            .push_bind(&record.first_name)
            .push_bind(record.date_of_birth)
            .push_bind(&record.address)
            .push_bind(&record.phone_number)
            .push_bind(&record.state)
            .push_bind(&record.zip_code)
            .push_bind(&record.email)
            .push_bind(&record.gender)
            .push_bind(&record.user_type);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn insert_accounts(pool: &PgPool, records: &[AccountRecord]) -> DbResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO user_accounts (id, account_name) ");
    builder.push_values(records, |mut b, record| {
        b.push_bind(Uuid::new_v4()).push_bind(&record.account_name);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn insert_policy_categories(
    pool: &PgPool,
    records: &[PolicyCategoryRecord],
) -> DbResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO policy_categories (id, category_name) ");
    builder.push_values(records, |mut b, record| {
        b.push_bind(Uuid::new_v4()).push_bind(&record.category_name);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn insert_policy_carriers(
    pool: &PgPool,
    records: &[PolicyCarrierRecord],
) -> DbResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO policy_carriers (id, company_name) ");
    builder.push_values(records, |mut b, record| {
        b.push_bind(Uuid::new_v4()).push_bind(&record.company_name);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn insert_policy_infos(pool: &PgPool, records: &[PolicyInfoRecord]) -> DbResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO policy_infos (id, policy_number, policy_start_date, policy_end_date, \
         policy_category_ref, account_ref, carrier_ref, user_ref) ",
    );
    builder.push_values(records, |mut b, record| {
        b.push_bind(Uuid::new_v4())
            .push_bind(&record.policy_number)
            .push_bind(record.policy_start_date)
            .push_bind(record.policy_end_date)
            .push_bind(&record.policy_category_ref)
            .push_bind(&record.account_ref)
            .push_bind(&record.carrier_ref)
            .push_bind(&record.user_ref);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_counts_default_is_zero() {
        let counts = PersistedCounts::default();
        assert_eq!(counts.agents, 0);
        assert_eq!(counts.policy_infos, 0);
    }
}
