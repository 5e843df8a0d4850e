//! Interactive console control surface.
//!
//! Reads commands line-by-line from stdin and drives a running
//! [`ReminderScheduler`]: pausing, snoozing, toggling do-not-disturb,
//! testing channels, and reloading configuration. The loop exits on
//! `quit` or when stdin closes.
//!
//! All command output goes to the supplied writer; diagnostic logging
//! stays on the tracing subscriber and never mixes into the prompt.

use std::io::{self, BufRead, Write};

use crate::scheduler::ReminderScheduler;

/// One recognized console command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Pause(Option<u64>),
    Resume,
    Snooze(Option<u64>),
    ToggleDnd,
    Test,
    Reload,
    Help,
    Quit,
}

/// Outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Parsed {
    Command(Command),
    Empty,
    BadArgument(String),
    Unknown(String),
}

/// Run the console loop against the process stdin/stdout.
///
/// # Errors
///
/// Returns an error if reading stdin or writing stdout fails.
pub fn run(scheduler: &ReminderScheduler) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(scheduler, &mut stdin.lock(), &mut stdout.lock())
}

fn run_with(
    scheduler: &ReminderScheduler,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<()> {
    writeln!(output, "LookAway running in console mode.")?;
    print_help(output)?;

    let mut line = String::new();
    loop {
        write!(output, "LookAway> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            // stdin closed
            writeln!(output)?;
            writeln!(output, "Exiting LookAway...")?;
            break;
        }

        match parse(&line) {
            Parsed::Empty => {}
            Parsed::BadArgument(raw) => writeln!(output, "Invalid number: {raw}.")?,
            Parsed::Unknown(word) => writeln!(
                output,
                "Unknown command: {word}. Type 'help' for available commands."
            )?,
            Parsed::Command(command) => {
                if !dispatch(scheduler, &command, output)? {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Execute one command; returns `false` when the loop should exit.
fn dispatch(
    scheduler: &ReminderScheduler,
    command: &Command,
    output: &mut impl Write,
) -> io::Result<bool> {
    match command {
        Command::Status => writeln!(output, "{}", scheduler.get_status())?,
        Command::Pause(minutes) => {
            scheduler.pause(*minutes);
            match minutes {
                Some(minutes) => writeln!(output, "Reminders paused for {minutes} minute(s).")?,
                None => writeln!(output, "Reminders paused.")?,
            }
        }
        Command::Resume => {
            scheduler.resume();
            writeln!(output, "Reminders resumed.")?;
        }
        Command::Snooze(minutes) => {
            let until = scheduler.snooze(*minutes);
            writeln!(
                output,
                "Next reminder snoozed until {}.",
                until.format("%H:%M:%S")
            )?;
        }
        Command::ToggleDnd => match scheduler.toggle_do_not_disturb() {
            Ok(true) => writeln!(output, "Do Not Disturb enabled.")?,
            Ok(false) => writeln!(output, "Do Not Disturb disabled.")?,
            Err(err) => writeln!(output, "Could not update settings: {err}")?,
        },
        Command::Test => {
            let results = scheduler.test_notifications();
            writeln!(output, "Notification test results:")?;
            if results.is_empty() {
                writeln!(output, "  (no channels enabled)")?;
            }
            for (name, ok) in &results {
                writeln!(output, "  {name}: {}", if *ok { "ok" } else { "failed" })?;
            }
        }
        Command::Reload => {
            scheduler.reload_config();
            writeln!(output, "Configuration reloaded.")?;
        }
        Command::Help => print_help(output)?,
        Command::Quit => {
            writeln!(output, "Exiting LookAway...")?;
            return Ok(false);
        }
    }
    Ok(true)
}

fn print_help(output: &mut impl Write) -> io::Result<()> {
    writeln!(output, "Commands:")?;
    writeln!(output, "  status       - Show current status")?;
    writeln!(output, "  pause [min]  - Pause reminders, resuming after min if given")?;
    writeln!(output, "  resume       - Resume reminders")?;
    writeln!(output, "  snooze [min] - Snooze the next reminder")?;
    writeln!(output, "  dnd          - Toggle Do Not Disturb")?;
    writeln!(output, "  test         - Test notification channels")?;
    writeln!(output, "  reload       - Reload configuration from disk")?;
    writeln!(output, "  help         - Show this list")?;
    writeln!(output, "  quit         - Exit")?;
    Ok(())
}

fn parse(line: &str) -> Parsed {
    let mut tokens = line.split_whitespace();
    let Some(word) = tokens.next() else {
        return Parsed::Empty;
    };

    let command = match word.to_lowercase().as_str() {
        "status" => Command::Status,
        "pause" => match parse_minutes(tokens.next()) {
            Ok(minutes) => Command::Pause(minutes),
            Err(raw) => return Parsed::BadArgument(raw),
        },
        "resume" => Command::Resume,
        "snooze" => match parse_minutes(tokens.next()) {
            Ok(minutes) => Command::Snooze(minutes),
            Err(raw) => return Parsed::BadArgument(raw),
        },
        "dnd" => Command::ToggleDnd,
        "test" => Command::Test,
        "reload" => Command::Reload,
        "help" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return Parsed::Unknown(word.to_owned()),
    };
    Parsed::Command(command)
}

fn parse_minutes(token: Option<&str>) -> Result<Option<u64>, String> {
    match token {
        None => Ok(None),
        Some(raw) => raw.parse::<u64>().map(Some).map_err(|_| raw.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::{Settings, SettingsStore};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn make_scheduler() -> (ReminderScheduler, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at_dir(dir.path());
        let mut settings = Settings::default();
        settings.notifications.desktop = false;
        settings.first_run = false;
        store.save(&settings).unwrap();
        (ReminderScheduler::new(store), dir)
    }

    fn run_session(scheduler: &ReminderScheduler, script: &str) -> String {
        let mut input = Cursor::new(script.to_owned());
        let mut output = Vec::new();
        run_with(scheduler, &mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse("status"), Parsed::Command(Command::Status));
        assert_eq!(parse("resume"), Parsed::Command(Command::Resume));
        assert_eq!(parse("dnd"), Parsed::Command(Command::ToggleDnd));
        assert_eq!(parse("test"), Parsed::Command(Command::Test));
        assert_eq!(parse("reload"), Parsed::Command(Command::Reload));
        assert_eq!(parse("help"), Parsed::Command(Command::Help));
    }

    #[test]
    fn parses_quit_aliases() {
        for alias in ["quit", "exit", "q"] {
            assert_eq!(parse(alias), Parsed::Command(Command::Quit));
        }
    }

    #[test]
    fn parsing_ignores_case_and_surrounding_space() {
        assert_eq!(parse("  STATUS  \n"), Parsed::Command(Command::Status));
        assert_eq!(parse("Pause 10"), Parsed::Command(Command::Pause(Some(10))));
    }

    #[test]
    fn pause_and_snooze_take_optional_minutes() {
        assert_eq!(parse("pause"), Parsed::Command(Command::Pause(None)));
        assert_eq!(parse("pause 15"), Parsed::Command(Command::Pause(Some(15))));
        assert_eq!(parse("snooze"), Parsed::Command(Command::Snooze(None)));
        assert_eq!(parse("snooze 3"), Parsed::Command(Command::Snooze(Some(3))));
    }

    #[test]
    fn non_numeric_argument_is_rejected() {
        assert_eq!(parse("snooze soon"), Parsed::BadArgument("soon".to_owned()));
        assert_eq!(parse("pause -5"), Parsed::BadArgument("-5".to_owned()));
    }

    #[test]
    fn blank_lines_parse_to_empty() {
        assert_eq!(parse(""), Parsed::Empty);
        assert_eq!(parse("   \n"), Parsed::Empty);
    }

    #[test]
    fn unknown_words_are_reported_verbatim() {
        assert_eq!(parse("restart"), Parsed::Unknown("restart".to_owned()));
    }

    #[test]
    fn quit_ends_the_session() {
        let (scheduler, _dir) = make_scheduler();
        let transcript = run_session(&scheduler, "quit\n");
        assert!(transcript.contains("Exiting LookAway..."));
    }

    #[test]
    fn eof_ends_the_session() {
        let (scheduler, _dir) = make_scheduler();
        let transcript = run_session(&scheduler, "status\n");
        assert!(transcript.contains("Running:"));
        assert!(transcript.ends_with("Exiting LookAway...\n"));
    }

    #[test]
    fn dnd_command_toggles_both_ways() {
        let (scheduler, _dir) = make_scheduler();
        let transcript = run_session(&scheduler, "dnd\ndnd\nquit\n");
        assert!(transcript.contains("Do Not Disturb enabled."));
        assert!(transcript.contains("Do Not Disturb disabled."));
    }

    #[test]
    fn pause_resume_snooze_confirmations() {
        let (scheduler, _dir) = make_scheduler();
        let transcript = run_session(&scheduler, "pause 2\nresume\nsnooze 1\nquit\n");
        assert!(transcript.contains("Reminders paused for 2 minute(s)."));
        assert!(transcript.contains("Reminders resumed."));
        assert!(transcript.contains("Next reminder snoozed until"));
    }

    #[test]
    fn test_command_reports_missing_channels() {
        let (scheduler, _dir) = make_scheduler();
        let transcript = run_session(&scheduler, "test\nquit\n");
        assert!(transcript.contains("(no channels enabled)"));
    }

    #[test]
    fn unknown_command_points_at_help() {
        let (scheduler, _dir) = make_scheduler();
        let transcript = run_session(&scheduler, "frobnicate\nquit\n");
        assert!(transcript.contains("Unknown command: frobnicate."));
    }
}
