//! Notification channel contract.

/// Delivery channel contract. New channels only need to implement this trait.
///
/// The scheduler loop is synchronous, so the seam is too; channels wrapping
/// an asynchronous client bridge internally (see the Telegram channel).
pub trait NotificationChannel: Send + Sync {
    /// Stable channel identifier (e.g. `desktop`, `email`).
    fn name(&self) -> &'static str;

    /// Deliver one notification to this channel's destination.
    fn send(&self, title: &str, message: &str) -> anyhow::Result<()>;

    /// Self-test by delivering a canned test notification.
    fn test(&self) -> anyhow::Result<()>;
}
