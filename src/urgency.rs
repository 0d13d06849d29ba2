use chrono::{DateTime, Local};
use crate::models::Task;

/// Score given to completed tasks so they always sort last.
pub const COMPLETED_SCORE: f64 = -1000.0;

/// Tasks at or under this many minutes get the short-task bonus.
const SHORT_TASK_MINUTES: u32 = 10;
const SHORT_TASK_BONUS: f64 = 15.0;

/// Calculates the ranking score of a task at `now`.
///
/// The score is the sum of independent contributions:
/// - **Priority**: `priority * 20`.
/// - **Should-do-at**: up to 100 once the target instant has passed, decaying by
///   half a point per minute overdue; up to 50 before it, decaying by a quarter
///   point per minute still to go.
/// - **Usually-do-at**: up to 30, decaying by a sixth of a point per minute away
///   from the habitual time in either direction.
/// - **Short task**: +15 for tasks of ten minutes or less.
///
/// # Returns
/// - `-1000.0` if the task is completed.
/// - Otherwise the unclamped sum above (higher ranks first).
pub fn compute_urgency(task: &Task, now: DateTime<Local>) -> f64 {
    if task.completed {
        return COMPLETED_SCORE;
    }

    let mut score = f64::from(task.priority) * 20.0;

    if let Some(target) = task.should_do_at {
        let delta = minutes_between(now, target);
        score += if now >= target {
            (100.0 - delta / 2.0).max(0.0)
        } else {
            (50.0 - delta / 4.0).max(0.0)
        };
    }

    if let Some(habit) = task.usually_do_at {
        score += (30.0 - minutes_between(now, habit) / 6.0).max(0.0);
    }

    if task.duration_minutes <= SHORT_TASK_MINUTES {
        score += SHORT_TASK_BONUS;
    }

    score
}

/// Absolute distance between two instants in fractional minutes.
fn minutes_between(a: DateTime<Local>, b: DateTime<Local>) -> f64 {
    (a - b).num_milliseconds().abs() as f64 / 60_000.0
}
