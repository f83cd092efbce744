pub mod schedule;

pub use schedule::{ScheduleMessageCommand, ScheduleMessageError, ScheduleMessageResponse};
