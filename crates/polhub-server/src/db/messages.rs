//! Scheduled message storage
//!
//! Messages are only stored with their computed timestamp; nothing executes
//! at that time.

use chrono::NaiveDateTime;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbResult;

/// Insert one scheduled message, returning its id.
pub async fn insert_scheduled_message(
    pool: &PgPool,
    message: &str,
    scheduled_time: NaiveDateTime,
) -> DbResult<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO scheduled_messages (id, message, scheduled_time)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(id)
    .bind(message)
    .bind(scheduled_time)
    .execute(pool)
    .await?;

    Ok(id)
}
