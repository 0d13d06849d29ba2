use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Display grouping for a task. Has no effect on scoring.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Chores,
    Appointment,
    Routine,
    Leisure,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chores => "chores",
            Category::Appointment => "appointment",
            Category::Routine => "routine",
            Category::Leisure => "leisure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chores" | "chore" => Ok(Category::Chores),
            "appointment" | "appt" => Ok(Category::Appointment),
            "routine" => Ok(Category::Routine),
            "leisure" => Ok(Category::Leisure),
            other => Err(format!(
                "unknown category '{}'. Supported: chores, appointment, routine, leisure",
                other
            )),
        }
    }
}

/// Which calendar days a completed recurring task comes back on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurringType {
    #[default]
    Daily,
    Weekdays,
    Weekends,
    Custom,
}

impl RecurringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringType::Daily => "daily",
            RecurringType::Weekdays => "weekdays",
            RecurringType::Weekends => "weekends",
            RecurringType::Custom => "custom",
        }
    }
}

impl fmt::Display for RecurringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurringType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RecurringType::Daily),
            "weekdays" => Ok(RecurringType::Weekdays),
            "weekends" => Ok(RecurringType::Weekends),
            "custom" => Ok(RecurringType::Custom),
            other => Err(format!(
                "unknown recurrence '{}'. Supported: daily, weekdays, weekends, custom",
                other
            )),
        }
    }
}

/// Represents a single tracked task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier, assigned by the store and never reused.
    pub id: u64,
    /// Non-empty display text.
    pub title: String,
    /// Planned length of the task in minutes (always > 0).
    pub duration_minutes: u32,
    /// Deadline / target instant.
    #[serde(default)]
    pub should_do_at: Option<DateTime<Local>>,
    /// Habitual time hint. Soft affinity only.
    #[serde(default)]
    pub usually_do_at: Option<DateTime<Local>>,
    /// 1..=5, 5 is highest.
    pub priority: u8,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_running: bool,
    /// Set when a run begins, cleared on stop.
    #[serde(default)]
    pub start_time: Option<DateTime<Local>>,
    /// Seconds counted toward `duration_minutes * 60`. May exceed it while a
    /// non-auto-complete task keeps running past its deadline.
    #[serde(default)]
    pub elapsed_time_seconds: u64,
    #[serde(default)]
    pub auto_complete: bool,
    #[serde(default)]
    pub is_recurring: bool,
    /// Only meaningful when `is_recurring`.
    #[serde(default)]
    pub recurring_type: Option<RecurringType>,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday. Only meaningful for `Custom`.
    #[serde(default)]
    pub recurring_days: BTreeSet<u8>,
    /// Local calendar day a recurring task was last finished.
    #[serde(default)]
    pub last_completed_date: Option<NaiveDate>,
    /// Set once the time-up alert has fired for the current run.
    #[serde(default)]
    pub time_up_alerted: bool,
}

impl Task {
    /// Planned length in seconds.
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// A task that is neither running nor completed but has time on the clock.
    pub fn is_paused(&self) -> bool {
        !self.is_running && !self.completed && self.elapsed_time_seconds > 0
    }
}

/// User-supplied fields for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub duration_minutes: u32,
    pub should_do_at: Option<DateTime<Local>>,
    pub usually_do_at: Option<DateTime<Local>>,
    pub priority: u8,
    pub category: Category,
    pub auto_complete: bool,
    pub is_recurring: bool,
    pub recurring_type: RecurringType,
    pub recurring_days: BTreeSet<u8>,
}

impl Default for NewTask {
    fn default() -> Self {
        NewTask {
            title: String::new(),
            duration_minutes: 15,
            should_do_at: None,
            usually_do_at: None,
            priority: 3,
            category: Category::Chores,
            auto_complete: false,
            is_recurring: false,
            recurring_type: RecurringType::Daily,
            recurring_days: BTreeSet::new(),
        }
    }
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..NewTask::default()
        }
    }

    /// Checks the add-task input contract. Invalid input is rejected silently by the store.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
            && self.duration_minutes > 0
            && (1..=5).contains(&self.priority)
    }

    /// Builds the stored task with runtime fields at their defaults.
    pub(crate) fn into_task(self, id: u64) -> Task {
        let recurring_type = self.is_recurring.then_some(self.recurring_type);
        let recurring_days = if recurring_type == Some(RecurringType::Custom) {
            self.recurring_days.into_iter().filter(|d| *d <= 6).collect()
        } else {
            BTreeSet::new()
        };
        Task {
            id,
            title: self.title.trim().to_string(),
            duration_minutes: self.duration_minutes,
            should_do_at: self.should_do_at,
            usually_do_at: self.usually_do_at,
            priority: self.priority,
            category: self.category,
            completed: false,
            is_running: false,
            start_time: None,
            elapsed_time_seconds: 0,
            auto_complete: self.auto_complete,
            is_recurring: self.is_recurring,
            recurring_type,
            recurring_days,
            last_completed_date: None,
            time_up_alerted: false,
        }
    }
}
