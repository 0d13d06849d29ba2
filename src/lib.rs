//! # Taskpulse
//!
//! A terminal task tracker that decides what to do next. Every open task gets a
//! score from its priority, its deadline and the time you usually do it; the
//! running task always sits on top and finished tasks sink to the bottom.
//!
//! ## Features
//!
//! *   **Dynamic ranking**: Scores are recomputed every second, so a task drifts
//!     up the list as its target time approaches and stays near the top once overdue.
//! *   **Per-task timers**: Start, pause and stop a countdown for one task at a time.
//!     Starting a task pauses whichever task was running.
//! *   **Time-up alerts**: The terminal bell rings once when time runs out. Tasks
//!     marked auto-complete finish themselves instead and ring twice.
//! *   **Recurring tasks**: Daily, weekday, weekend or custom-day tasks reopen on
//!     the first tick of an eligible day after they were completed.
//! *   **Dual Interface**: A scriptable CLI and an interactive TUI share one snapshot file.
//!
//! ## Score
//!
//! 1.  `priority * 20`.
//! 2.  Up to +100 once the should-do-at time has passed (−0.5 per minute late),
//!     up to +50 before it (−0.25 per minute early).
//! 3.  Up to +30 near the usually-do-at time (−1/6 per minute away).
//! 4.  +15 for tasks of ten minutes or less.
//!
//! Completed tasks score `-1000`.
//!
//! ## Data Storage
//!
//! Tasks are saved in your local data directory
//! (`~/.local/share/taskpulse/tasks.json` on Linux). Override it with the
//! `TASKPULSE_DB` environment variable or `data_file` in
//! `~/.config/taskpulse/config.toml`.

pub mod alert;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod ranking;
pub mod recurrence;
pub mod storage;
pub mod store;
pub mod timer;
pub mod tracker;
pub mod tui;
pub mod urgency;
