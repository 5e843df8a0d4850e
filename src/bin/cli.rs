//! CLI binary for LookAway.

use clap::{Parser, Subcommand};
use lookaway::config::{Settings, SettingsStore};
use lookaway::{ReminderScheduler, console};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// LookAway: eye break reminder service.
#[derive(Parser)]
#[command(name = "lookaway", version, about)]
struct Cli {
    /// Directory holding settings.json (defaults to the user config dir).
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Start the reminder service with the interactive console.
    Start,

    /// Write the default settings file for hand-editing.
    Setup {
        /// Overwrite an existing configuration.
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration and scheduler state without starting.
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let store = match cli.config_dir {
        Some(dir) => SettingsStore::at_dir(dir),
        None => SettingsStore::new(),
    };

    match cli.command.unwrap_or(Command::Start) {
        Command::Start => run_start(store),
        Command::Setup { force } => run_setup(&store, force),
        Command::Status => run_status(store),
    }
}

fn run_start(store: SettingsStore) -> anyhow::Result<()> {
    let settings = store.load();
    if settings.first_run {
        anyhow::bail!(
            "LookAway is not configured yet. Run `lookaway setup` first, then edit {}",
            store.path().display()
        );
    }

    // Keep the guard alive so buffered log-file output is flushed on exit.
    let _guard = init_logging(&settings);

    println!("LookAway v{}", env!("CARGO_PKG_VERSION"));

    let scheduler = ReminderScheduler::new(store);
    scheduler.start()?;

    let console_result = console::run(&scheduler);
    scheduler.stop();
    console_result?;
    Ok(())
}

fn run_setup(store: &SettingsStore, force: bool) -> anyhow::Result<()> {
    if !force && !store.is_first_run() {
        println!("LookAway is already configured.");
        println!(
            "Use `lookaway setup --force` to reset {}.",
            store.path().display()
        );
        return Ok(());
    }

    store.save(&Settings::default())?;
    store.mark_setup_complete()?;
    println!("Wrote default settings to {}.", store.path().display());
    println!("Enable channels and tweak intervals there, then run `lookaway start`.");
    Ok(())
}

fn run_status(store: SettingsStore) -> anyhow::Result<()> {
    if store.is_first_run() {
        println!("LookAway is not configured. Run `lookaway setup` first.");
        return Ok(());
    }

    let settings = store.load();
    let path = store.path().to_path_buf();
    let scheduler = ReminderScheduler::new(store);
    println!("{}", scheduler.get_status());
    println!(
        "Sleep hours:     {} - {}",
        settings.sleep_hours.start, settings.sleep_hours.end
    );
    println!(
        "Long break:      every {} reminders",
        settings.long_break_interval
    );
    println!("Snooze default:  {} minute(s)", settings.snooze_minutes);
    println!("Settings file:   {}", path.display());
    Ok(())
}

/// Install the tracing subscriber: stderr output plus a plain-text log
/// file under the configured log directory.
///
/// Returns the non-blocking writer guard, or `None` when the log
/// directory cannot be created and only stderr logging is active.
fn init_logging(settings: &Settings) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Users can override the level with RUST_LOG.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lookaway={}", settings.logging.level)));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = PathBuf::from(&settings.logging.directory);
    match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&log_dir, "lookaway.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        Err(err) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            tracing::warn!("could not create log directory {}: {err}", log_dir.display());
            None
        }
    }
}
