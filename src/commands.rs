use std::collections::BTreeSet;
use std::io::{self, Write};

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::{info, warn};

use crate::alert::{AlertEmitter, SilentAlerts, TerminalBell};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::models::{Category, NewTask, RecurringType, Task};
use crate::ranking::{progress_percentage, remaining_label};
use crate::storage::{delete_store, load_store, save_store};
use crate::tracker::Tracker;
use crate::urgency::compute_urgency;

pub type CliTracker = Tracker<SystemClock, Box<dyn AlertEmitter>>;

/// Raw add-task options as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub title: String,
    pub minutes: Option<u32>,
    pub priority: Option<u8>,
    pub category: Option<String>,
    pub should_do_at: Option<String>,
    pub usually_do_at: Option<String>,
    pub auto_complete: bool,
    pub recur: Option<String>,
    pub days: Option<String>,
}

/// Picks the alert emitter the config asks for.
pub fn alert_emitter(config: &Config) -> Box<dyn AlertEmitter> {
    if config.alerts {
        Box::new(TerminalBell::stdout())
    } else {
        Box::new(SilentAlerts)
    }
}

/// Restores the tracker from the snapshot and catches it up to now.
///
/// Timers are wall-clock based, so a task started by an earlier command has kept
/// running in the meantime; this tick applies any time-up, auto-complete or
/// recurrence reset that happened while nothing was watching.
///
/// Whatever the catch-up tick changed is saved right away, so a command that
/// fails or is rejected afterwards cannot replay the same alert next time.
pub fn open_tracker(config: &Config) -> Result<CliTracker> {
    let store = load_store(&config.data_file)?;
    let mut tracker = Tracker::new(store, SystemClock, alert_emitter(config));
    if tracker.tick().changed_state() {
        save_tracker(config, &tracker)?;
    }
    Ok(tracker)
}

pub fn save_tracker(config: &Config, tracker: &CliTracker) -> Result<()> {
    save_store(&config.data_file, tracker.store())
}

/// Parses `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM` or `HH:MM` (today) as local time.
pub fn parse_when(s: &str, now: DateTime<Local>) -> std::result::Result<DateTime<Local>, String> {
    let s = s.trim();
    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveTime::parse_from_str(s, "%H:%M")
                .ok()
                .map(|t| now.date_naive().and_time(t))
        })
        .ok_or_else(|| format!("Invalid time '{}'. Use YYYY-MM-DD HH:MM or HH:MM.", s))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("'{}' does not exist in the local time zone.", s))
}

/// Parses a weekday list such as `mon,wed,fri` or `1,3,5` (0 = Sunday).
pub fn parse_days(s: &str) -> std::result::Result<BTreeSet<u8>, String> {
    const NAMES: [&str; 7] = ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];
    s.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            if let Ok(n) = d.parse::<u8>() {
                return if n <= 6 { Ok(n) } else { Err(format!("Day index {} is outside 0..=6.", n)) };
            }
            let lower = d.to_lowercase();
            NAMES
                .iter()
                .position(|name| lower == *name || lower == name[..3])
                .map(|i| i as u8)
                .ok_or_else(|| format!("Unknown day '{}'.", d))
        })
        .collect()
}

/// Fills parsed command-line options into an add-task input.
pub fn apply_options(input: &mut NewTask, opts: &AddOptions, now: DateTime<Local>) -> std::result::Result<(), String> {
    if let Some(m) = opts.minutes {
        input.duration_minutes = m;
    }
    if let Some(p) = opts.priority {
        input.priority = p;
    }
    if let Some(c) = &opts.category {
        input.category = c.parse::<Category>()?;
    }
    if let Some(s) = &opts.should_do_at {
        input.should_do_at = Some(parse_when(s, now)?);
    }
    if let Some(s) = &opts.usually_do_at {
        input.usually_do_at = Some(parse_when(s, now)?);
    }
    if let Some(r) = &opts.recur {
        input.is_recurring = true;
        input.recurring_type = r.parse::<RecurringType>()?;
    }
    if let Some(d) = &opts.days {
        input.recurring_days = parse_days(d)?;
    }
    input.auto_complete = opts.auto_complete;
    Ok(())
}

/// Adds a new task.
///
/// Unset fields fall back to the configured defaults. Returns the new id, or
/// `None` when the input was rejected.
pub fn cmd_add(config: &Config, opts: AddOptions, silent: bool) -> Result<Option<u64>> {
    let mut tracker = open_tracker(config)?;
    let now = tracker.now();

    let mut input = config.defaults.new_task(opts.title.clone());
    let parsed = apply_options(&mut input, &opts, now);
    if let Err(msg) = parsed {
        if !silent { eprintln!("{}", msg); }
        return Ok(None);
    }

    match tracker.add(input) {
        Some(id) => {
            save_tracker(config, &tracker)?;
            info!(id, "task added");
            if !silent { println!("Task added (id = {})", id); }
            Ok(Some(id))
        }
        None => {
            if !silent { eprintln!("Task not added: title must not be empty, minutes must be > 0 and priority 1-5."); }
            Ok(None)
        }
    }
}

/// Starts the timer of a task, pausing whichever task was running.
pub fn cmd_start(config: &Config, id: u64, silent: bool) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let task = tracker.store().get(id).ok_or(TrackerError::NotFound(id))?;
    if task.completed {
        if !silent { eprintln!("Task {} is completed. Reopen it with `complete {}` first.", id, id); }
        return Ok(());
    }
    let paused = tracker.store().running().map(|t| t.id).filter(|r| *r != id);
    tracker.start(id);
    save_tracker(config, &tracker)?;
    if !silent {
        if let Some(other) = paused {
            println!("Task {} paused.", other);
        }
        println!("Task {} started.", id);
    }
    Ok(())
}

/// Pauses a task, keeping its elapsed time.
pub fn cmd_pause(config: &Config, id: u64, silent: bool) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    if !tracker.pause(id) {
        return Err(TrackerError::NotFound(id));
    }
    save_tracker(config, &tracker)?;
    if !silent { println!("Task {} paused.", id); }
    Ok(())
}

/// Stops a task and discards its elapsed time.
pub fn cmd_stop(config: &Config, id: u64, silent: bool) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    if !tracker.stop(id) {
        return Err(TrackerError::NotFound(id));
    }
    save_tracker(config, &tracker)?;
    if !silent { println!("Task {} stopped.", id); }
    Ok(())
}

/// Toggles completion of a task.
pub fn cmd_complete(config: &Config, id: u64, silent: bool) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let completed = tracker.toggle_complete(id).ok_or(TrackerError::NotFound(id))?;
    save_tracker(config, &tracker)?;
    if !silent {
        if completed {
            println!("Task {} marked as complete.", id);
        } else {
            println!("Task {} reopened.", id);
        }
    }
    Ok(())
}

/// Removes a task permanently.
pub fn cmd_remove(config: &Config, id: u64, silent: bool) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    if !tracker.delete(id) {
        return Err(TrackerError::NotFound(id));
    }
    save_tracker(config, &tracker)?;
    if !silent { println!("Task {} removed.", id); }
    Ok(())
}

/// Short recurrence description for listings.
pub fn recurrence_label(task: &Task) -> String {
    if !task.is_recurring {
        return String::new();
    }
    match task.recurring_type {
        Some(RecurringType::Custom) => {
            const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
            let days: Vec<&str> = task
                .recurring_days
                .iter()
                .filter_map(|d| NAMES.get(usize::from(*d)).copied())
                .collect();
            format!("custom ({})", days.join(","))
        }
        Some(kind) => kind.to_string(),
        None => "-".to_string(),
    }
}

/// Human status of a task.
pub fn status_label(task: &Task) -> &'static str {
    if task.completed {
        "Done"
    } else if task.is_running {
        "Running"
    } else if task.is_paused() {
        "Paused"
    } else {
        "Idle"
    }
}

/// Lists tasks in ranked order.
///
/// By default, hides completed tasks unless `all` is true.
pub fn cmd_list(config: &Config, all: bool) -> Result<()> {
    let tracker = open_tracker(config)?;
    let now = tracker.now();
    let tasks: Vec<&Task> = tracker
        .ranked()
        .into_iter()
        .filter(|t| all || !t.completed)
        .collect();
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Pri").add_attribute(Attribute::Bold),
            Cell::new("Min").add_attribute(Attribute::Bold),
            Cell::new("Left").add_attribute(Attribute::Bold),
            Cell::new("Progress").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Repeats").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let score = compute_urgency(t, now);
        let score_color = if t.completed {
            Color::Grey
        } else if score > 150.0 {
            Color::Red
        } else if score > 80.0 {
            Color::Yellow
        } else {
            Color::Green
        };
        let status = status_label(t);
        let status_color = match status {
            "Done" => Color::Green,
            "Running" => Color::Cyan,
            _ => Color::Yellow,
        };
        let expired = t.elapsed_time_seconds >= t.total_seconds();

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(t.category),
            Cell::new(t.priority),
            Cell::new(t.duration_minutes),
            Cell::new(remaining_label(t)).fg(if expired && !t.completed { Color::Red } else { Color::Reset }),
            Cell::new(format!("{:.0}%", progress_percentage(t))),
            Cell::new(format!("{:.1}", score)).fg(score_color),
            Cell::new(status).fg(status_color),
            Cell::new(recurrence_label(t)),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Deletes every task by removing the snapshot file.
pub fn cmd_reset(config: &Config, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    delete_store(&config.data_file)?;
    warn!(path = %config.data_file.display(), "task snapshot deleted");
    println!("Database reset successfully.");
    Ok(())
}
