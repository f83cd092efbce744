pub mod commands;
pub mod routes;

pub use commands::{ScheduleMessageCommand, ScheduleMessageResponse};
