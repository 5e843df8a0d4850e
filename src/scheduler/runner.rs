//! Reminder scheduling loop.
//!
//! A dedicated background thread wakes once a minute and decides whether
//! the moment is right for an eye-break reminder: pause, do-not-disturb,
//! snooze, and the nightly sleep window all suppress it, and at least one
//! full interval must have passed since the last one. When a reminder is
//! due the loop picks its content (every Nth becomes a long break) and
//! hands it to the notification dispatcher.
//!
//! All control operations may be called from other threads while the loop
//! runs; runtime state is a set of independently mutable flags and
//! timestamps, so no cross-field transaction is ever needed.

use chrono::{DateTime, Duration as TimeDelta, Local, NaiveTime};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::channels::NotificationDispatcher;
use crate::config::{Settings, SettingsStore};
use crate::error::{LookawayError, Result};
use crate::scheduler::status::SchedulerStatus;

/// Seconds between eligibility checks.
const POLL_INTERVAL_SECS: u64 = 60;

/// Bound on waiting for the loop thread to exit during `stop()`.
const STOP_TIMEOUT_SECS: u64 = 5;

/// Upper clamp for minute values taken from settings or user input (one year).
const MAX_MINUTES: u64 = 525_600;

/// Reminder text used when the configured message pool is empty.
const FALLBACK_MESSAGE: &str = "Time to rest your eyes!";

/// Title for ordinary quick-break reminders.
const QUICK_BREAK_TITLE: &str = "Eye Break Reminder";

/// Title for periodic long-break reminders.
const LONG_BREAK_TITLE: &str = "Time for a Long Break!";

/// Background scheduler driving eye-break reminders.
///
/// Cheap to clone; clones share one underlying scheduler.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    store: SettingsStore,
    settings: RwLock<Settings>,
    dispatcher: RwLock<NotificationDispatcher>,
    running: AtomicBool,
    paused: AtomicBool,
    reminder_count: AtomicU64,
    last_reminder_time: Mutex<Option<DateTime<Local>>>,
    snooze_until: Mutex<Option<DateTime<Local>>>,
    worker: Mutex<Option<LoopHandle>>,
}

/// Handshake ends for one running loop thread.
struct LoopHandle {
    shutdown_tx: Sender<()>,
    done_rx: Receiver<()>,
    thread: JoinHandle<()>,
}

/// Title and text of one composed reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderContent {
    pub title: String,
    pub message: String,
}

impl ReminderScheduler {
    /// Build a scheduler reading its configuration from `store`.
    pub fn new(store: SettingsStore) -> Self {
        let settings = store.load();
        let dispatcher = NotificationDispatcher::from_settings(&settings);
        Self {
            inner: Arc::new(Inner {
                store,
                settings: RwLock::new(settings),
                dispatcher: RwLock::new(dispatcher),
                running: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                reminder_count: AtomicU64::new(0),
                last_reminder_time: Mutex::new(None),
                snooze_until: Mutex::new(None),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Start the background loop.
    ///
    /// Seeds `last_reminder_time` with the current time, so the first
    /// reminder fires only after one full interval. Calling `start` on a
    /// running scheduler logs a warning and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop thread cannot be spawned.
    pub fn start(&self) -> Result<()> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            warn!("scheduler is already running");
            return Ok(());
        }

        *lock_unpoisoned(&self.inner.last_reminder_time) = Some(Local::now());

        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded::<()>(1);
        let scheduler = self.clone();
        let spawned = std::thread::Builder::new()
            .name("lookaway-scheduler".to_owned())
            .spawn(move || scheduler.run_loop(&shutdown_rx, &done_tx));
        let thread = match spawned {
            Ok(thread) => thread,
            Err(err) => {
                self.inner.running.store(false, Ordering::SeqCst);
                return Err(LookawayError::Scheduler(format!(
                    "failed to spawn scheduler thread: {err}"
                )));
            }
        };

        *lock_unpoisoned(&self.inner.worker) = Some(LoopHandle {
            shutdown_tx,
            done_rx,
            thread,
        });
        let interval = read_lock(&self.inner.settings).reminder_interval_minutes;
        info!("eye break scheduler started (interval: {interval} min)");
        Ok(())
    }

    /// Stop the background loop, waiting a bounded time for it to exit.
    ///
    /// A send already in flight is never interrupted; if the loop does not
    /// come back within the bound it is left to finish detached.
    pub fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            warn!("scheduler is not running");
            return;
        }
        let Some(handle) = lock_unpoisoned(&self.inner.worker).take() else {
            return;
        };

        let _ = handle.shutdown_tx.send(());
        match handle
            .done_rx
            .recv_timeout(Duration::from_secs(STOP_TIMEOUT_SECS))
        {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.thread.join();
                info!("eye break scheduler stopped");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("scheduler loop did not exit within {STOP_TIMEOUT_SECS}s, detaching");
            }
        }
    }

    /// Suspend reminders, optionally resuming automatically after a delay.
    pub fn pause(&self, duration_minutes: Option<u64>) {
        self.inner.paused.store(true, Ordering::SeqCst);
        match duration_minutes {
            Some(minutes) => {
                info!("scheduler paused for {minutes} minute(s)");
                let scheduler = self.clone();
                let delay = Duration::from_secs(minutes.saturating_mul(60));
                let spawned = std::thread::Builder::new()
                    .name("lookaway-pause-timer".to_owned())
                    .spawn(move || {
                        std::thread::sleep(delay);
                        scheduler.resume();
                    });
                if let Err(err) = spawned {
                    warn!("failed to schedule automatic resume: {err}");
                }
            }
            None => info!("scheduler paused indefinitely"),
        }
    }

    /// Resume reminders and drop any active snooze.
    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
        *lock_unpoisoned(&self.inner.snooze_until) = None;
        info!("scheduler resumed");
    }

    /// Suppress the next reminder until `minutes` from now (defaulting to
    /// the configured snooze length). Returns the suppression deadline.
    pub fn snooze(&self, minutes: Option<u64>) -> DateTime<Local> {
        let minutes = minutes.unwrap_or_else(|| read_lock(&self.inner.settings).snooze_minutes);
        let until = Local::now() + clamped_minutes(minutes);
        *lock_unpoisoned(&self.inner.snooze_until) = Some(until);
        info!("next reminder snoozed for {minutes} minute(s)");
        until
    }

    /// Flip the persisted do-not-disturb flag and return the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be saved.
    pub fn toggle_do_not_disturb(&self) -> Result<bool> {
        let current = read_lock(&self.inner.settings).do_not_disturb;
        let updated = self
            .inner
            .store
            .update(|settings| settings.do_not_disturb = !current)?;
        let enabled = updated.do_not_disturb;
        *write_lock(&self.inner.settings) = updated;
        info!(
            "do not disturb {}",
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(enabled)
    }

    /// Reload settings from disk and rebuild every notification channel.
    pub fn reload_config(&self) {
        let settings = self.inner.store.load();
        write_lock(&self.inner.dispatcher).reload(&settings);
        *write_lock(&self.inner.settings) = settings;
        info!("configuration reloaded");
    }

    /// Run every enabled channel's self-test.
    pub fn test_notifications(&self) -> BTreeMap<String, bool> {
        read_lock(&self.inner.dispatcher).test_all_connections()
    }

    /// Snapshot the scheduler state. Side-effect free and valid at any
    /// time, including before `start()`.
    pub fn get_status(&self) -> SchedulerStatus {
        let settings = read_lock(&self.inner.settings).clone();
        let last = *lock_unpoisoned(&self.inner.last_reminder_time);
        SchedulerStatus {
            is_running: self.inner.running.load(Ordering::SeqCst),
            is_paused: self.inner.paused.load(Ordering::SeqCst),
            do_not_disturb: settings.do_not_disturb,
            reminder_count: self.inner.reminder_count.load(Ordering::SeqCst),
            last_reminder_time: last,
            next_reminder_time: last
                .map(|t| t + clamped_minutes(settings.reminder_interval_minutes.max(1))),
            snooze_until: *lock_unpoisoned(&self.inner.snooze_until),
            enabled_channels: read_lock(&self.inner.dispatcher).enabled_channels(),
            is_sleep_time: is_sleep_time(&settings, Local::now().time()),
            interval_minutes: settings.reminder_interval_minutes,
        }
    }

    fn run_loop(&self, shutdown_rx: &Receiver<()>, done_tx: &Sender<()>) {
        debug!("scheduler loop running");
        loop {
            if self.should_send_reminder() {
                self.send_reminder();
            }
            match shutdown_rx.recv_timeout(Duration::from_secs(POLL_INTERVAL_SECS)) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("scheduler loop exiting");
        let _ = done_tx.send(());
    }

    /// One eligibility check; every condition must hold for a reminder to
    /// fire.
    fn should_send_reminder(&self) -> bool {
        if self.inner.paused.load(Ordering::SeqCst) {
            return false;
        }
        let settings = read_lock(&self.inner.settings).clone();
        if settings.do_not_disturb {
            return false;
        }

        let now = Local::now();
        {
            let mut snooze = lock_unpoisoned(&self.inner.snooze_until);
            if let Some(until) = *snooze {
                if now < until {
                    return false;
                }
                // The snooze window has passed; clear it on observation.
                *snooze = None;
            }
        }

        if is_sleep_time(&settings, now.time()) {
            return false;
        }

        let Some(last) = *lock_unpoisoned(&self.inner.last_reminder_time) else {
            return true;
        };
        let interval = clamped_minutes(settings.reminder_interval_minutes.max(1));
        now.signed_duration_since(last) >= interval
    }

    fn send_reminder(&self) {
        let settings = read_lock(&self.inner.settings).clone();
        let count = self.inner.reminder_count.fetch_add(1, Ordering::SeqCst) + 1;
        let content = compose_reminder(&settings, count);

        let results =
            read_lock(&self.inner.dispatcher).send_notification(&content.title, &content.message);

        let delivered: Vec<&str> = results
            .iter()
            .filter(|(_, ok)| **ok)
            .map(|(name, _)| name.as_str())
            .collect();
        if delivered.is_empty() {
            warn!("reminder #{count} failed to send via any channel");
        } else {
            info!("reminder #{count} sent via: {}", delivered.join(", "));
        }

        *lock_unpoisoned(&self.inner.last_reminder_time) = Some(Local::now());
        *lock_unpoisoned(&self.inner.snooze_until) = None;
    }
}

/// Pick title and text for the `count`-th reminder.
///
/// Every `long_break_interval`-th reminder becomes a long break; the rest
/// draw a random message from the configured pool.
pub fn compose_reminder(settings: &Settings, count: u64) -> ReminderContent {
    let long_every = settings.long_break_interval.max(1);
    let (title, body) = if count % long_every == 0 {
        let break_type = &settings.break_types.long_break;
        (
            LONG_BREAK_TITLE.to_owned(),
            format!(
                "{} ({} minutes)",
                break_type.description,
                break_type.duration_seconds / 60
            ),
        )
    } else {
        let body = settings
            .messages
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned());
        (QUICK_BREAK_TITLE.to_owned(), body)
    };
    ReminderContent {
        title,
        message: format!("{body}\n\nReminder #{count}"),
    }
}

/// Whether `now` falls inside the configured sleep window.
///
/// Invalid window bounds are logged and treated as "not sleep time".
fn is_sleep_time(settings: &Settings, now: NaiveTime) -> bool {
    match settings.sleep_hours.window() {
        Ok((start, end)) => in_sleep_window(now, start, end),
        Err(err) => {
            warn!("sleep hours are invalid, ignoring them: {err}");
            false
        }
    }
}

/// Window test with both bounds inclusive; `start > end` wraps midnight.
fn in_sleep_window(now: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start > end {
        now >= start || now <= end
    } else {
        start <= now && now <= end
    }
}

fn clamped_minutes(minutes: u64) -> TimeDelta {
    TimeDelta::minutes(minutes.min(MAX_MINUTES) as i64)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
