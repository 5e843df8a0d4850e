//! Desktop toast notifications via the OS notification service.

use notify_rust::{Notification, Timeout};
use tracing::debug;

use crate::channels::traits::NotificationChannel;

/// How long a toast stays on screen, where the platform honors it.
const TOAST_TIMEOUT_MS: u32 = 10_000;

/// Channel delivering OS-native toast notifications.
///
/// Needs no credentials; any error from the notification service is the
/// failure.
pub struct DesktopChannel;

impl DesktopChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for DesktopChannel {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn send(&self, title: &str, message: &str) -> anyhow::Result<()> {
        debug!("showing desktop toast: {title}");
        Notification::new()
            .appname("LookAway")
            .summary(title)
            .body(message)
            .timeout(Timeout::Milliseconds(TOAST_TIMEOUT_MS))
            .show()?;
        Ok(())
    }

    fn test(&self) -> anyhow::Result<()> {
        self.send("LookAway Test", "Desktop notifications are working!")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn name_is_stable() {
        assert_eq!(DesktopChannel::new().name(), "desktop");
    }
}
