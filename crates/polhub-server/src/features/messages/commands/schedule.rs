//! Schedule message command
//!
//! Stores a message with the wall-clock time it is meant for. Rows are
//! storage only; nothing fires when the scheduled time arrives.

use chrono::NaiveDateTime;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMessageCommand {
    pub message: String,
    pub day: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleMessageResponse {
    pub id: Uuid,
    pub scheduled_time: NaiveDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleMessageError {
    #[error("Message is required and cannot be empty")]
    MessageRequired,
    #[error("Invalid day/time: '{0}' does not parse as a datetime")]
    InvalidDateTime(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<db::DbError> for ScheduleMessageError {
    fn from(err: db::DbError) -> Self {
        match err {
            db::DbError::Sqlx(e) => ScheduleMessageError::Database(e),
            db::DbError::NotFound(_) => ScheduleMessageError::Database(sqlx::Error::RowNotFound),
        }
    }
}

impl Request<Result<ScheduleMessageResponse, ScheduleMessageError>> for ScheduleMessageCommand {}

impl crate::cqrs::middleware::Command for ScheduleMessageCommand {}

impl ScheduleMessageCommand {
    pub fn validate(&self) -> Result<(), ScheduleMessageError> {
        if self.message.trim().is_empty() {
            return Err(ScheduleMessageError::MessageRequired);
        }
        self.scheduled_time()?;
        Ok(())
    }

    /// Combine `day` and `time` into a naive wall-clock datetime.
    ///
    /// Seconds are optional in the time component.
    pub fn scheduled_time(&self) -> Result<NaiveDateTime, ScheduleMessageError> {
        let combined = format!("{} {}", self.day.trim(), self.time.trim());
        NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M"))
            .map_err(|_| ScheduleMessageError::InvalidDateTime(combined))
    }
}

#[tracing::instrument(skip(pool, command))]
pub async fn handle(
    pool: PgPool,
    command: ScheduleMessageCommand,
) -> Result<ScheduleMessageResponse, ScheduleMessageError> {
    command.validate()?;
    let scheduled_time = command.scheduled_time()?;

    let id = db::insert_scheduled_message(&pool, &command.message, scheduled_time).await?;

    tracing::info!(%id, %scheduled_time, "message scheduled");

    Ok(ScheduleMessageResponse { id, scheduled_time })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(message: &str, day: &str, time: &str) -> ScheduleMessageCommand {
        ScheduleMessageCommand {
            message: message.to_string(),
            day: day.to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn test_parses_with_seconds() {
        let cmd = command("renewal reminder", "2026-09-01", "14:30:00");
        let when = cmd.scheduled_time().unwrap();
        assert_eq!(when.to_string(), "2026-09-01 14:30:00");
    }

    #[test]
    fn test_parses_without_seconds() {
        let cmd = command("renewal reminder", "2026-09-01", "14:30");
        let when = cmd.scheduled_time().unwrap();
        assert_eq!(when.to_string(), "2026-09-01 14:30:00");
    }

    #[test]
    fn test_rejects_malformed_day() {
        let cmd = command("renewal reminder", "01/09/2026", "14:30");
        assert!(matches!(
            cmd.scheduled_time(),
            Err(ScheduleMessageError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_rejects_empty_message() {
        let cmd = command("  ", "2026-09-01", "14:30");
        assert!(matches!(
            cmd.validate(),
            Err(ScheduleMessageError::MessageRequired)
        ));
    }
}
