//! Per-tick timer update for the running task.
//!
//! Elapsed time is always derived from the wall clock (`now - start_time`), so
//! a missed tick or a restored snapshot catches up on the next call.
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --start--> Running (from zero)
//!   ^                |  \
//!   +------stop------+   +--elapsed >= total, auto-complete--> Completed
//! ```

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::alert::{AlertEmitter, AlertKind};
use crate::clock::local_day;
use crate::models::Task;
use crate::store::TaskStore;

/// What a single tick did to one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Elapsed time moved forward (or stayed put).
    Advanced { elapsed: u64 },
    /// Planned time ran out on a task that waits for a manual close.
    TimeUp { elapsed: u64 },
    /// The task finished itself.
    AutoCompleted,
}

/// Advances one running task to `now`.
///
/// Returns `None` for entries that are not running or have no start time;
/// those are left untouched.
pub fn advance(task: &mut Task, now: DateTime<Local>) -> Option<TickOutcome> {
    if !task.is_running {
        return None;
    }
    let start = task.start_time?;
    let elapsed = (now - start).num_seconds().max(0) as u64;
    let total = task.total_seconds();

    if elapsed >= total && task.auto_complete {
        task.completed = true;
        task.is_running = false;
        task.elapsed_time_seconds = total;
        if task.is_recurring {
            task.last_completed_date = Some(local_day(now));
        }
        return Some(TickOutcome::AutoCompleted);
    }

    task.elapsed_time_seconds = elapsed;
    if elapsed >= total && !task.time_up_alerted {
        task.time_up_alerted = true;
        return Some(TickOutcome::TimeUp { elapsed });
    }
    Some(TickOutcome::Advanced { elapsed })
}

/// Runs the timer update over the store and raises alerts.
///
/// Returns `(alerts emitted, tasks auto-completed)`.
pub fn advance_running<A: AlertEmitter + ?Sized>(
    store: &mut TaskStore,
    now: DateTime<Local>,
    alerts: &mut A,
) -> (usize, usize) {
    let mut emitted = 0;
    let mut completed = 0;
    for task in store.tasks_mut() {
        if task.is_running && task.start_time.is_none() {
            warn!(id = task.id, "running task has no start time; skipping");
            continue;
        }
        match advance(task, now) {
            Some(TickOutcome::TimeUp { elapsed }) => {
                info!(id = task.id, elapsed, "time is up");
                alerts.emit(AlertKind::TimeUp);
                emitted += 1;
            }
            Some(TickOutcome::AutoCompleted) => {
                info!(id = task.id, title = %task.title, "task auto-completed");
                alerts.emit(AlertKind::Completion);
                emitted += 1;
                completed += 1;
            }
            Some(TickOutcome::Advanced { .. }) | None => {}
        }
    }
    (emitted, completed)
}
