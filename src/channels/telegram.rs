//! Telegram notifications via the Bot API.
//!
//! The HTTP client is asynchronous while the scheduler loop is not, so each
//! send runs on a short-lived worker thread hosting its own current-thread
//! runtime. The worker is detached; the caller waits on a result channel
//! with a hard bound, so a hung API call can never stall the loop.

use serde_json::json;
use std::sync::mpsc;
use std::time::Duration;
use tracing::debug;

use crate::channels::traits::NotificationChannel;
use crate::config::TelegramSettings;

/// Bound on one delivery attempt, covering the whole worker round trip.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Production Telegram Bot API endpoint.
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Channel delivering reminders as Markdown messages to a Telegram chat.
pub struct TelegramChannel {
    settings: TelegramSettings,
    api_base: String,
}

impl TelegramChannel {
    pub fn new(settings: TelegramSettings) -> Self {
        Self {
            settings,
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }

    /// Override the API base URL (tests point this at a local mock server).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn is_configured(&self) -> bool {
        !self.settings.bot_token.trim().is_empty() && !self.settings.chat_id.trim().is_empty()
    }

    fn deliver(&self, text: String) -> anyhow::Result<()> {
        if !self.is_configured() {
            anyhow::bail!("telegram settings are incomplete (bot token and chat id are required)");
        }

        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base, self.settings.bot_token
        );
        let payload = json!({
            "chat_id": self.settings.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        debug!("dispatching telegram send worker");
        let (result_tx, result_rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("lookaway-telegram-send".to_owned())
            .spawn(move || {
                let _ = result_tx.send(post_on_fresh_runtime(&url, &payload));
            })?;

        match result_rx.recv_timeout(SEND_TIMEOUT) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                anyhow::bail!("telegram send timed out after {}s", SEND_TIMEOUT.as_secs())
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("telegram send worker exited without a result")
            }
        }
    }
}

/// Run one `sendMessage` POST on a runtime owned by the calling thread.
fn post_on_fresh_runtime(url: &str, payload: &serde_json::Value) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        let response = client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("telegram send failed ({status}): {body}");
        }
        Ok(())
    })
}

impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn send(&self, title: &str, message: &str) -> anyhow::Result<()> {
        self.deliver(format!(
            "\u{1f514} *{title}*\n\n{message}\n\n_Take care of your eyes!_ \u{1f440}"
        ))
    }

    fn test(&self) -> anyhow::Result<()> {
        self.send(
            "Test Notification",
            "Telegram notifications are working correctly!",
        )
    }
}
