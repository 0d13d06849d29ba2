use chrono::NaiveDate;
use tracing::info;

use crate::clock::weekday_index;
use crate::models::{RecurringType, Task};
use crate::store::TaskStore;

/// Whether a completed recurring task should come back on `today`.
///
/// A task finished today stays finished. Otherwise the recurrence type decides
/// by weekday (0 = Sunday .. 6 = Saturday).
pub fn should_reset(task: &Task, today: NaiveDate) -> bool {
    if !task.is_recurring || !task.completed {
        return false;
    }
    let last = match task.last_completed_date {
        Some(d) => d,
        None => return false,
    };
    if last == today {
        return false;
    }
    let day = weekday_index(today);
    match task.recurring_type {
        Some(RecurringType::Daily) => true,
        Some(RecurringType::Weekdays) => (1..=5).contains(&day),
        Some(RecurringType::Weekends) => day == 0 || day == 6,
        Some(RecurringType::Custom) => task.recurring_days.contains(&day),
        None => false,
    }
}

/// Reopens every recurring task whose schedule has rolled over. Returns how many.
pub fn reset_due(store: &mut TaskStore, today: NaiveDate) -> usize {
    let mut resets = 0;
    for task in store.tasks_mut() {
        if should_reset(task, today) {
            task.completed = false;
            task.is_running = false;
            task.start_time = None;
            task.elapsed_time_seconds = 0;
            task.last_completed_date = None;
            info!(id = task.id, title = %task.title, "recurring task reopened");
            resets += 1;
        }
    }
    resets
}
