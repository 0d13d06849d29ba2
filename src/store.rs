use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{NewTask, Task};

/// In-memory collection of tasks, kept in insertion order.
///
/// Every lifecycle transition goes through here, including the cross-task
/// rule that only one task may be running at a time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskStore {
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    tasks: Vec<Task>,
}

fn first_id() -> u64 {
    1
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore {
            next_id: first_id(),
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// The running task, if any.
    pub fn running(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.is_running)
    }

    /// Adds a task from user input.
    ///
    /// Returns `None` and leaves the store untouched when the input is invalid
    /// or no unused id is left.
    pub fn add(&mut self, input: NewTask) -> Option<u64> {
        if !input.is_valid() {
            debug!(title = %input.title, "rejected invalid task input");
            return None;
        }
        // Snapshots written by hand may carry ids past the counter.
        let max_existing = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let Some(id) = max_existing.checked_add(1).map(|floor| self.next_id.max(floor)) else {
            warn!("task ids exhausted; add rejected");
            return None;
        };
        self.next_id = id.saturating_add(1);
        let task = input.into_task(id);
        debug!(id, title = %task.title, "task added");
        self.tasks.push(task);
        Some(id)
    }

    /// Starts `id` from zero and pauses every other task.
    ///
    /// Completed tasks cannot be started. Returns whether the task started.
    pub fn start(&mut self, id: u64, now: DateTime<Local>) -> bool {
        match self.get(id) {
            Some(t) if !t.completed => {}
            _ => return false,
        }
        for task in self.tasks.iter_mut() {
            if task.id == id {
                task.is_running = true;
                task.start_time = Some(now);
                task.elapsed_time_seconds = 0;
                task.time_up_alerted = false;
            } else {
                task.is_running = false;
            }
        }
        debug!(id, "task started");
        true
    }

    /// Stops the clock but keeps elapsed time. No-op on a task that is not running.
    pub fn pause(&mut self, id: u64) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                if task.is_running {
                    task.is_running = false;
                    debug!(id, elapsed = task.elapsed_time_seconds, "task paused");
                }
                true
            }
            None => false,
        }
    }

    /// Stops the clock and discards elapsed time.
    pub fn stop(&mut self, id: u64) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.is_running = false;
                task.start_time = None;
                task.elapsed_time_seconds = 0;
                debug!(id, "task stopped");
                true
            }
            None => false,
        }
    }

    /// Flips the completed flag and returns the new value.
    ///
    /// Completing a task halts it; completing a recurring task stamps `today`.
    /// Un-completing leaves every other field as it was.
    pub fn toggle_complete(&mut self, id: u64, today: NaiveDate) -> Option<bool> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        if task.completed {
            task.is_running = false;
            if task.is_recurring {
                task.last_completed_date = Some(today);
            }
        }
        debug!(id, completed = task.completed, "task completion toggled");
        Some(task.completed)
    }

    /// Removes a task permanently, together with its alert marker.
    pub fn delete(&mut self, id: u64) -> bool {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != len_before;
        if removed {
            debug!(id, "task deleted");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 3, h, m, s).unwrap()
    }

    fn store_with(titles: &[&str]) -> (TaskStore, Vec<u64>) {
        let mut store = TaskStore::new();
        let ids = titles
            .iter()
            .map(|t| store.add(NewTask::titled(*t)).unwrap())
            .collect();
        (store, ids)
    }

    #[test]
    fn add_rejects_blank_title_without_side_effects() {
        let mut store = TaskStore::new();
        assert_eq!(store.add(NewTask::titled("  \t ")), None);
        assert!(store.is_empty());
        assert_eq!(store.add(NewTask::titled("Dishes")), Some(1));
    }

    #[test]
    fn default_store_starts_ids_at_one() {
        let mut store = TaskStore::default();
        assert_eq!(store, TaskStore::new());
        assert_eq!(store.add(NewTask::titled("a")), Some(1));
    }

    #[test]
    fn add_at_top_of_id_space_is_rejected() {
        let (mut store, ids) = store_with(&["a"]);
        store.tasks_mut()[0].id = u64::MAX;
        assert_eq!(store.add(NewTask::titled("b")), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(u64::MAX).map(|t| t.title.as_str()), Some("a"));
        assert!(store.get(ids[0]).is_none());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (mut store, ids) = store_with(&["a", "b"]);
        assert!(store.delete(ids[1]));
        let next = store.add(NewTask::titled("c")).unwrap();
        assert_eq!(next, 3);
    }

    #[test]
    fn start_pauses_all_others_without_touching_their_elapsed() {
        let (mut store, ids) = store_with(&["a", "b"]);
        store.start(ids[0], at(9, 0, 0));
        store.tasks_mut()[0].elapsed_time_seconds = 42;
        store.start(ids[1], at(9, 1, 0));

        let a = store.get(ids[0]).unwrap();
        assert!(!a.is_running);
        assert_eq!(a.elapsed_time_seconds, 42);
        assert_eq!(store.running().map(|t| t.id), Some(ids[1]));
    }

    #[test]
    fn restart_resets_elapsed_and_alert_marker() {
        let (mut store, ids) = store_with(&["a"]);
        store.start(ids[0], at(9, 0, 0));
        {
            let t = &mut store.tasks_mut()[0];
            t.elapsed_time_seconds = 900;
            t.time_up_alerted = true;
        }
        store.start(ids[0], at(10, 0, 0));
        let t = store.get(ids[0]).unwrap();
        assert_eq!(t.elapsed_time_seconds, 0);
        assert!(!t.time_up_alerted);
        assert_eq!(t.start_time, Some(at(10, 0, 0)));
    }

    #[test]
    fn pause_twice_changes_nothing() {
        let (mut store, ids) = store_with(&["a"]);
        store.start(ids[0], at(9, 0, 0));
        store.tasks_mut()[0].elapsed_time_seconds = 30;
        store.pause(ids[0]);
        let once = store.clone();
        store.pause(ids[0]);
        assert_eq!(store, once);
        assert!(store.get(ids[0]).unwrap().is_paused());
    }

    #[test]
    fn stop_always_resets_clock() {
        let (mut store, ids) = store_with(&["a"]);
        store.start(ids[0], at(9, 0, 0));
        store.tasks_mut()[0].elapsed_time_seconds = 75;
        assert!(store.stop(ids[0]));
        let t = store.get(ids[0]).unwrap();
        assert!(!t.is_running);
        assert_eq!(t.start_time, None);
        assert_eq!(t.elapsed_time_seconds, 0);
    }

    #[test]
    fn completing_a_running_task_halts_it() {
        let (mut store, ids) = store_with(&["a"]);
        store.start(ids[0], at(9, 0, 0));
        let today = at(9, 0, 0).date_naive();
        assert_eq!(store.toggle_complete(ids[0], today), Some(true));
        assert!(store.running().is_none());
        assert!(!store.start(ids[0], at(9, 5, 0)));
        assert!(store.running().is_none());
    }

    #[test]
    fn toggle_stamps_recurring_and_uncomplete_keeps_stamp() {
        let mut store = TaskStore::new();
        let id = store
            .add(NewTask {
                is_recurring: true,
                ..NewTask::titled("Water plants")
            })
            .unwrap();
        let today = at(9, 0, 0).date_naive();
        store.toggle_complete(id, today);
        assert_eq!(store.get(id).unwrap().last_completed_date, Some(today));
        store.toggle_complete(id, today + Duration::days(1));
        let t = store.get(id).unwrap();
        assert!(!t.completed);
        assert_eq!(t.last_completed_date, Some(today));
    }

    #[test]
    fn non_recurring_completion_leaves_date_unset() {
        let (mut store, ids) = store_with(&["a"]);
        store.toggle_complete(ids[0], at(9, 0, 0).date_naive());
        assert_eq!(store.get(ids[0]).unwrap().last_completed_date, None);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut store = TaskStore::new();
        assert!(!store.start(9, at(9, 0, 0)));
        assert!(!store.pause(9));
        assert!(!store.stop(9));
        assert!(!store.delete(9));
        assert_eq!(store.toggle_complete(9, at(9, 0, 0).date_naive()), None);
    }
}
