//! Eye-break reminder scheduling.
//!
//! [`runner`] owns the background loop and its control surface (pause,
//! snooze, do-not-disturb, reload); [`status`] is the read-only snapshot
//! handed to callers.

pub mod runner;
pub mod status;

pub use runner::ReminderScheduler;
pub use status::SchedulerStatus;
