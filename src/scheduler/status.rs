//! Scheduler status snapshot.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// Point-in-time view of the scheduler, safe to take at any moment.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    /// Loop thread is alive.
    pub is_running: bool,
    /// Reminders are suspended until resume.
    pub is_paused: bool,
    /// Persisted do-not-disturb flag.
    pub do_not_disturb: bool,
    /// Reminders fired since start.
    pub reminder_count: u64,
    /// When the last reminder attempt completed (seeded at start).
    pub last_reminder_time: Option<DateTime<Local>>,
    /// Earliest moment the next reminder can fire, other conditions permitting.
    pub next_reminder_time: Option<DateTime<Local>>,
    /// Active snooze deadline, if any.
    pub snooze_until: Option<DateTime<Local>>,
    /// Names of the enabled delivery channels.
    pub enabled_channels: Vec<String>,
    /// Whether the sleep window suppresses reminders right now.
    pub is_sleep_time: bool,
    /// Configured reminder interval in minutes.
    pub interval_minutes: u64,
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Running:         {}", yes_no(self.is_running))?;
        writeln!(f, "Paused:          {}", yes_no(self.is_paused))?;
        writeln!(f, "Do not disturb:  {}", yes_no(self.do_not_disturb))?;
        writeln!(f, "Sleep time now:  {}", yes_no(self.is_sleep_time))?;
        writeln!(f, "Interval:        {} min", self.interval_minutes)?;
        writeln!(f, "Reminders sent:  {}", self.reminder_count)?;
        writeln!(f, "Last reminder:   {}", clock(self.last_reminder_time))?;
        writeln!(f, "Next reminder:   {}", clock(self.next_reminder_time))?;
        writeln!(f, "Snoozed until:   {}", clock(self.snooze_until))?;
        write!(
            f,
            "Channels:        {}",
            if self.enabled_channels.is_empty() {
                "none".to_owned()
            } else {
                self.enabled_channels.join(", ")
            }
        )
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn clock(time: Option<DateTime<Local>>) -> String {
    time.map_or_else(
        || "-".to_owned(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn sample() -> SchedulerStatus {
        SchedulerStatus {
            is_running: true,
            is_paused: false,
            do_not_disturb: false,
            reminder_count: 7,
            last_reminder_time: None,
            next_reminder_time: None,
            snooze_until: None,
            enabled_channels: vec!["desktop".to_owned(), "telegram".to_owned()],
            is_sleep_time: false,
            interval_minutes: 20,
        }
    }

    #[test]
    fn display_lists_flags_and_channels() {
        let rendered = sample().to_string();
        assert!(rendered.contains("Running:         yes"));
        assert!(rendered.contains("Reminders sent:  7"));
        assert!(rendered.contains("desktop, telegram"));
        assert!(rendered.contains("Next reminder:   -"));
    }

    #[test]
    fn display_shows_none_without_channels() {
        let mut status = sample();
        status.enabled_channels.clear();
        assert!(status.to_string().contains("Channels:        none"));
    }

    #[test]
    fn serializes_to_json() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["reminder_count"], 7);
        assert_eq!(value["is_running"], true);
    }
}
