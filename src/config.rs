//! Configuration types and the on-disk settings store.
//!
//! Settings live in a single `settings.json`. Every struct carries
//! `#[serde(default)]` so a partially written file deep-merges over the
//! built-in defaults field by field - a missing key can never take the
//! scheduler down.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{LookawayError, Result};

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minutes between eye-break reminders.
    pub reminder_interval_minutes: u64,
    /// Which delivery channels are active.
    pub notifications: NotificationToggles,
    /// SMTP credentials for the email channel.
    pub email_settings: EmailSettings,
    /// Bot credentials for the Telegram channel.
    pub telegram_settings: TelegramSettings,
    /// Daily window during which reminders are suppressed.
    pub sleep_hours: SleepHours,
    /// Message pool for ordinary reminders.
    pub messages: Vec<String>,
    /// Quick and long break descriptions.
    pub break_types: BreakTypes,
    /// Every Nth reminder becomes a long break.
    pub long_break_interval: u64,
    /// Default snooze length in minutes.
    pub snooze_minutes: u64,
    /// Suppress all reminders until toggled off again.
    pub do_not_disturb: bool,
    /// True until setup has written this file once.
    pub first_run: bool,
    /// Log output settings.
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminder_interval_minutes: 20,
            notifications: NotificationToggles::default(),
            email_settings: EmailSettings::default(),
            telegram_settings: TelegramSettings::default(),
            sleep_hours: SleepHours::default(),
            messages: vec![
                "Time for a break! Look away from your screen for 20 seconds.".to_owned(),
                "Take a moment to rest your eyes. Look at something 20 feet away.".to_owned(),
                "Eye break time! Blink several times and look into the distance.".to_owned(),
                "Give your eyes a rest. Focus on something far away for a moment.".to_owned(),
                "Break time! Close your eyes for a few seconds or look outside.".to_owned(),
            ],
            break_types: BreakTypes::default(),
            long_break_interval: 3,
            snooze_minutes: 5,
            do_not_disturb: false,
            first_run: true,
            logging: LoggingSettings::default(),
        }
    }
}

/// Per-channel enable flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationToggles {
    /// OS toast notifications.
    pub desktop: bool,
    /// SMTP email notifications.
    pub email: bool,
    /// Telegram bot notifications.
    pub telegram: bool,
}

impl Default for NotificationToggles {
    fn default() -> Self {
        Self {
            desktop: true,
            email: false,
            telegram: false,
        }
    }
}

/// SMTP settings for the email channel.
///
/// All of `smtp_server`, `email`, `password`, and `recipient` must be
/// non-empty before a send is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// SMTP relay host.
    pub smtp_server: String,
    /// SMTP submission port.
    pub smtp_port: u16,
    /// Sender address, also used as the SMTP username.
    pub email: String,
    /// SMTP password or app password.
    pub password: String,
    /// Recipient address.
    pub recipient: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: String::new(),
            smtp_port: 587,
            email: String::new(),
            password: String::new(),
            recipient: String::new(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// Destination chat identifier.
    pub chat_id: String,
}

/// Daily quiet window, possibly wrapping midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepHours {
    /// Window start as "HH:MM".
    pub start: String,
    /// Window end as "HH:MM".
    pub end: String,
}

impl Default for SleepHours {
    fn default() -> Self {
        Self {
            start: "23:00".to_owned(),
            end: "07:00".to_owned(),
        }
    }
}

impl SleepHours {
    /// Parse the window bounds into times of day.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not a valid "HH:MM" clock time.
    pub fn window(&self) -> Result<(NaiveTime, NaiveTime)> {
        Ok((parse_clock(&self.start)?, parse_clock(&self.end)?))
    }
}

fn parse_clock(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| LookawayError::Config(format!("invalid clock time {raw:?}: {e}")))
}

/// Break kind descriptions shown in reminder text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakTypes {
    /// Ordinary short break.
    pub quick_break: BreakType,
    /// Periodic long break.
    pub long_break: BreakType,
}

impl Default for BreakTypes {
    fn default() -> Self {
        Self {
            quick_break: BreakType {
                duration_seconds: 20,
                description: "Quick eye rest - look away for 20 seconds".to_owned(),
            },
            long_break: BreakType {
                duration_seconds: 300,
                description: "Long break - step away from computer for 5 minutes".to_owned(),
            },
        }
    }
}

/// One break kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakType {
    /// Suggested break length in seconds.
    pub duration_seconds: u64,
    /// Human-readable description used in reminder text.
    pub description: String,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log level when `RUST_LOG` is not set.
    pub level: String,
    /// Directory receiving the log file.
    pub directory: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directory: "logs".to_owned(),
        }
    }
}

/// Handle on the settings file: loads, saves, and updates `Settings`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings_path: PathBuf,
}

impl SettingsStore {
    /// Store at the default per-user location.
    pub fn new() -> Self {
        Self {
            settings_path: default_settings_path(),
        }
    }

    /// Store inside an explicit directory (tests, `--config-dir`).
    pub fn at_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: dir.into().join("settings.json"),
        }
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings, merging the file over built-in defaults.
    ///
    /// A missing or unreadable file yields the defaults; the scheduler must
    /// keep working with whatever configuration is available.
    pub fn load(&self) -> Settings {
        let content = match std::fs::read_to_string(&self.settings_path) {
            Ok(content) => content,
            Err(err) => {
                debug!(
                    "no settings file at {} ({err}), using defaults",
                    self.settings_path.display()
                );
                return Settings::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(
                    "settings file {} is invalid ({err}), using defaults",
                    self.settings_path.display()
                );
                Settings::default()
            }
        }
    }

    /// Save settings, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialized.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| LookawayError::Config(e.to_string()))?;
        std::fs::write(&self.settings_path, content)?;
        debug!("settings saved to {}", self.settings_path.display());
        Ok(())
    }

    /// Load, apply one mutation, save, and return the updated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated settings cannot be saved.
    pub fn update(&self, apply: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let mut settings = self.load();
        apply(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }

    /// Whether setup still has to run.
    pub fn is_first_run(&self) -> bool {
        self.load().first_run
    }

    /// Clear the first-run flag after setup has completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be saved.
    pub fn mark_setup_complete(&self) -> Result<()> {
        self.update(|settings| settings.first_run = false)?;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the default settings path: `~/.config/lookaway/settings.json`.
pub fn default_settings_path() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("lookaway").join("settings.json")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home)
            .join(".config")
            .join("lookaway")
            .join("settings.json")
    } else {
        PathBuf::from("/tmp/lookaway-config/settings.json")
    }
}
