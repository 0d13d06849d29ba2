use std::cmp::Ordering;

use chrono::{DateTime, Local};

use crate::models::Task;
use crate::urgency::compute_urgency;

/// Display order: running task first, then open tasks by descending score,
/// then completed tasks. The sort is stable, so equal scores keep insertion order.
pub fn rank(tasks: &[Task], now: DateTime<Local>) -> Vec<&Task> {
    let mut scored: Vec<(&Task, f64)> = tasks.iter().map(|t| (t, compute_urgency(t, now))).collect();
    scored.sort_by(|(a, sa), (b, sb)| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| match (a.completed, b.completed) {
                (false, false) => b.is_running.cmp(&a.is_running),
                _ => Ordering::Equal,
            })
            .then_with(|| sb.partial_cmp(sa).unwrap_or(Ordering::Equal))
    });
    scored.into_iter().map(|(t, _)| t).collect()
}

/// Share of planned time used, 0..=100.
pub fn progress_percentage(task: &Task) -> f64 {
    if !task.is_running && task.elapsed_time_seconds == 0 {
        return 0.0;
    }
    let total = task.total_seconds();
    if total == 0 {
        return 0.0;
    }
    (task.elapsed_time_seconds as f64 / total as f64 * 100.0).min(100.0)
}

/// Remaining time as `M:SS`, or a terminal label once planned time is used up.
pub fn remaining_label(task: &Task) -> String {
    let total = task.total_seconds();
    if task.elapsed_time_seconds >= total {
        return if task.auto_complete {
            "auto-completed".to_string()
        } else {
            "time-expired".to_string()
        };
    }
    let remaining = total - task.elapsed_time_seconds;
    format!("{}:{:02}", remaining / 60, remaining % 60)
}
