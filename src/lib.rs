//! LookAway: eye-break reminder engine.
//!
//! Periodically reminds the user to look away from the screen, following
//! the 20-20-20 rule by default.
//!
//! # Architecture
//!
//! Independent pieces wired together at startup:
//! - **Configuration store**: Loads and persists `settings.json`, merging
//!   the file over built-in defaults
//! - **Notification channels**: Desktop toast, SMTP email, and Telegram
//!   bot delivery behind one trait
//! - **Dispatcher**: Fans a reminder out to every enabled channel and
//!   collects per-channel results
//! - **Scheduler**: Background loop deciding when a reminder is due,
//!   honoring pause, snooze, do-not-disturb, and sleep hours
//! - **Console**: Interactive command loop controlling a running scheduler

pub mod channels;
pub mod config;
pub mod console;
pub mod error;
pub mod scheduler;

pub use channels::NotificationDispatcher;
pub use config::{Settings, SettingsStore};
pub use error::{LookawayError, Result};
pub use scheduler::{ReminderScheduler, SchedulerStatus};
