//! Notification delivery channels (desktop toast, SMTP email, Telegram).
//!
//! Design goal: channel implementations are pluggable behind
//! [`traits::NotificationChannel`]. The dispatcher owns the enabled set,
//! fans one message out to every channel, and reports per-channel success
//! by name. One channel failing never keeps another from being attempted.

pub mod desktop;
pub mod email;
pub mod telegram;
pub mod traits;

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::channels::desktop::DesktopChannel;
use crate::channels::email::EmailChannel;
use crate::channels::telegram::TelegramChannel;
use crate::channels::traits::NotificationChannel;
use crate::config::Settings;

/// Fan-out dispatcher over the enabled notification channels.
pub struct NotificationDispatcher {
    channels: BTreeMap<String, Box<dyn NotificationChannel>>,
}

impl NotificationDispatcher {
    /// Build the channel set from the `notifications` toggles.
    ///
    /// Credentialed channels are constructed even when their credentials are
    /// blank; a missing credential is a per-send failure, not a construction
    /// failure.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut channels: BTreeMap<String, Box<dyn NotificationChannel>> = BTreeMap::new();
        if settings.notifications.desktop {
            insert_channel(&mut channels, Box::new(DesktopChannel::new()));
        }
        if settings.notifications.email {
            insert_channel(
                &mut channels,
                Box::new(EmailChannel::new(settings.email_settings.clone())),
            );
        }
        if settings.notifications.telegram {
            insert_channel(
                &mut channels,
                Box::new(TelegramChannel::new(settings.telegram_settings.clone())),
            );
        }

        let dispatcher = Self { channels };
        if dispatcher.channels.is_empty() {
            warn!("no notification channels are enabled");
        } else {
            info!(
                "notification channels enabled: [{}]",
                dispatcher.enabled_channels().join(", ")
            );
        }
        dispatcher
    }

    fn from_channels(channels: BTreeMap<String, Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Broadcast one notification to every enabled channel.
    ///
    /// Returns per-channel delivery success keyed by channel name.
    pub fn send_notification(&self, title: &str, message: &str) -> BTreeMap<String, bool> {
        self.broadcast("send", |channel| channel.send(title, message))
    }

    /// Run every enabled channel's self-test.
    pub fn test_all_connections(&self) -> BTreeMap<String, bool> {
        self.broadcast("self-test", |channel| channel.test())
    }

    fn broadcast(
        &self,
        action: &str,
        attempt: impl Fn(&dyn NotificationChannel) -> anyhow::Result<()>,
    ) -> BTreeMap<String, bool> {
        let mut results = BTreeMap::new();
        for (name, channel) in &self.channels {
            match attempt(channel.as_ref()) {
                Ok(()) => {
                    results.insert(name.clone(), true);
                }
                Err(err) => {
                    warn!("channel {name} {action} failed: {err}");
                    results.insert(name.clone(), false);
                }
            }
        }
        results
    }

    /// Names of the currently enabled channels.
    pub fn enabled_channels(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Discard all channel instances and rebuild them from new settings.
    pub fn reload(&mut self, settings: &Settings) {
        *self = Self::from_settings(settings);
    }
}

fn insert_channel(
    channels: &mut BTreeMap<String, Box<dyn NotificationChannel>>,
    channel: Box<dyn NotificationChannel>,
) {
    channels.insert(channel.name().to_owned(), channel);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    struct StubChannel {
        name: &'static str,
        ok: bool,
    }

    impl NotificationChannel for StubChannel {
        fn name(&self) -> &'static str {
            self.name
        }

        fn send(&self, _title: &str, _message: &str) -> anyhow::Result<()> {
            if self.ok {
                Ok(())
            } else {
                anyhow::bail!("stub failure")
            }
        }

        fn test(&self) -> anyhow::Result<()> {
            self.send("", "")
        }
    }

    fn stub_dispatcher(specs: &[(&'static str, bool)]) -> NotificationDispatcher {
        let mut channels: BTreeMap<String, Box<dyn NotificationChannel>> = BTreeMap::new();
        for &(name, ok) in specs {
            channels.insert(name.to_owned(), Box::new(StubChannel { name, ok }));
        }
        NotificationDispatcher::from_channels(channels)
    }

    #[test]
    fn failing_channel_does_not_affect_others() {
        let dispatcher = stub_dispatcher(&[("alpha", true), ("beta", false), ("gamma", true)]);
        let results = dispatcher.send_notification("Break", "Look away");
        assert_eq!(results.len(), 3);
        assert!(results["alpha"]);
        assert!(!results["beta"]);
        assert!(results["gamma"]);
    }

    #[test]
    fn self_test_reports_per_channel() {
        let dispatcher = stub_dispatcher(&[("alpha", false), ("beta", true)]);
        let results = dispatcher.test_all_connections();
        assert!(!results["alpha"]);
        assert!(results["beta"]);
    }

    #[test]
    fn construction_respects_toggles() {
        let mut settings = Settings::default();
        settings.notifications.desktop = false;
        settings.notifications.email = true;
        settings.notifications.telegram = true;
        let dispatcher = NotificationDispatcher::from_settings(&settings);
        assert_eq!(dispatcher.enabled_channels(), vec!["email", "telegram"]);
    }

    #[test]
    fn no_channels_yields_empty_results() {
        let mut settings = Settings::default();
        settings.notifications.desktop = false;
        let dispatcher = NotificationDispatcher::from_settings(&settings);
        assert!(dispatcher.enabled_channels().is_empty());
        assert!(dispatcher.send_notification("Break", "Look away").is_empty());
    }

    #[test]
    fn reload_rebuilds_from_scratch() {
        let mut settings = Settings::default();
        settings.notifications.desktop = false;
        settings.notifications.telegram = true;
        let mut dispatcher = NotificationDispatcher::from_settings(&settings);
        assert_eq!(dispatcher.enabled_channels(), vec!["telegram"]);

        settings.notifications.telegram = false;
        settings.notifications.email = true;
        dispatcher.reload(&settings);
        assert_eq!(dispatcher.enabled_channels(), vec!["email"]);
    }
}
