use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use taskpulse::commands::*;
use taskpulse::config::{Config, LOG_ENV};
use taskpulse::error::TrackerError;
use taskpulse::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskpulse")]
#[command(about = "Terminal task tracker with priority ranking and per-task timers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Planned duration in minutes
        #[arg(short, long)]
        minutes: Option<u32>,
        /// Priority from 1 (low) to 5 (highest)
        #[arg(short, long)]
        priority: Option<u8>,
        /// Category: chores, appointment, routine, leisure
        #[arg(short, long)]
        category: Option<String>,
        /// Deadline, "YYYY-MM-DD HH:MM" or "HH:MM" (today)
        #[arg(short, long)]
        should_do_at: Option<String>,
        /// Habitual time, "YYYY-MM-DD HH:MM" or "HH:MM" (today)
        #[arg(short, long)]
        usually_do_at: Option<String>,
        /// Complete the task automatically when its time is up
        #[arg(short, long)]
        auto_complete: bool,
        /// Recurrence (daily, weekdays, weekends, custom)
        #[arg(short, long)]
        recur: Option<String>,
        /// Days for custom recurrence, e.g. mon,wed,fri or 1,3,5
        #[arg(short, long)]
        days: Option<String>,
    },
    /// List tasks in ranked order
    List {
        /// Show completed tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Start a task's timer (pauses any other running task)
    Start {
        id: u64,
    },
    /// Pause a task's timer, keeping elapsed time
    Pause {
        id: u64,
    },
    /// Stop a task's timer and reset elapsed time
    Stop {
        id: u64,
    },
    /// Toggle a task between done and open
    Complete {
        id: u64,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// Reset the database (delete all tasks)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

/// CLI commands log to stderr; the TUI logs to a file so the screen stays clean.
///
/// On stderr only warnings show unless `TASKPULSE_LOG` asks for more.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_logging(config: &Config, to_file: bool) {
    let directive = if to_file || std::env::var(LOG_ENV).is_ok() {
        config.log_filter.as_str()
    } else {
        "warn"
    };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    if to_file {
        match open_log_file(&config.log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            Err(e) => eprintln!("Cannot open log file {}: {}", config.log_file.display(), e),
        }
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config, matches!(cli.command, Some(Commands::Ui) | None));

    let result: Result<(), TrackerError> = match cli.command {
        Some(Commands::Add { title, minutes, priority, category, should_do_at, usually_do_at, auto_complete, recur, days }) => {
            let opts = AddOptions { title, minutes, priority, category, should_do_at, usually_do_at, auto_complete, recur, days };
            cmd_add(&config, opts, false).map(|_| ())
        }
        Some(Commands::List { all }) => cmd_list(&config, all),
        Some(Commands::Start { id }) => cmd_start(&config, id, false),
        Some(Commands::Pause { id }) => cmd_pause(&config, id, false),
        Some(Commands::Stop { id }) => cmd_stop(&config, id, false),
        Some(Commands::Complete { id }) => cmd_complete(&config, id, false),
        Some(Commands::Remove { id }) => cmd_remove(&config, id, false),
        Some(Commands::Reset { force }) => cmd_reset(&config, force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return ExitCode::FAILURE;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskpulse", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(config) {
                tracing::error!(error = %e, "tui failed");
                eprintln!("Error running TUI: {}", e);
                return ExitCode::FAILURE;
            }
            Ok(())
        }
    };

    // The stderr subscriber would print the same failure again.
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
