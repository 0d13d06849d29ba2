use ratatui::widgets::TableState;
use tracing::error;

use crate::commands::{alert_emitter, apply_options, AddOptions, CliTracker};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::Result;
use crate::models::Task;
use crate::storage::{load_store, save_store};
use crate::tracker::Tracker;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

/// Steps of the "Add Task" wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddStep {
    Title,
    Minutes,
    Priority,
    Category,
    ShouldDoAt,
    UsuallyDoAt,
    AutoComplete,
    Recurrence,
    Days,
}

impl AddStep {
    pub fn prompt(&self) -> &'static str {
        match self {
            AddStep::Title => "Add Task: Enter Title",
            AddStep::Minutes => "Add Task: Minutes (Enter for default)",
            AddStep::Priority => "Add Task: Priority 1-5 (Enter for default)",
            AddStep::Category => "Add Task: chores / appointment / routine / leisure",
            AddStep::ShouldDoAt => "Add Task: Should do at (YYYY-MM-DD HH:MM or HH:MM, optional)",
            AddStep::UsuallyDoAt => "Add Task: Usually do at (optional)",
            AddStep::AutoComplete => "Add Task: Auto-complete when time is up? (y/N)",
            AddStep::Recurrence => "Add Task: Repeat daily / weekdays / weekends / custom (optional)",
            AddStep::Days => "Add Task: Days, e.g. mon,wed,fri",
        }
    }
}

pub struct App {
    pub tracker: CliTracker,
    pub config: Config,
    pub state: TableState,
    /// Id of the highlighted task. The row index in `state` follows it.
    selected: Option<u64>,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_step: AddStep,
    // Partial data collected by the wizard
    pub add_options: AddOptions,
    pub show_completed: bool,
    /// Last error or notice shown in the help bar.
    pub message: Option<String>,
}

impl App {
    /// Creates the app from the snapshot on disk.
    pub fn new(config: Config) -> Result<App> {
        let store = load_store(&config.data_file)?;
        let tracker = Tracker::new(store, SystemClock, alert_emitter(&config));
        let mut app = App {
            tracker,
            config,
            state: TableState::default(),
            selected: None,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_step: AddStep::Title,
            add_options: AddOptions::default(),
            show_completed: true,
            message: None,
        };
        app.on_tick();
        app.clamp_selection();
        Ok(app)
    }

    /// Tasks currently on screen, in ranked order.
    pub fn visible(&self) -> Vec<&Task> {
        self.tracker
            .ranked()
            .into_iter()
            .filter(|t| self.show_completed || !t.completed)
            .collect()
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    fn select(&mut self, index: usize) {
        let id = self.visible().get(index).map(|t| t.id);
        self.selected = id;
        self.state.select(id.map(|_| index));
    }

    /// Runs one tick of the tracker and saves if anything changed.
    pub fn on_tick(&mut self) {
        let report = self.tracker.tick();
        if report.changed_state() {
            self.persist();
        }
        self.clamp_selection();
    }

    /// Writes the store to disk. Failures are shown, not fatal.
    pub fn persist(&mut self) {
        if let Err(e) = save_store(&self.config.data_file, self.tracker.store()) {
            error!(error = %e, "failed to save tasks");
            self.message = Some(format!("Save failed: {}", e));
        }
    }

    /// Points the highlighted row back at the selected task after a re-rank.
    ///
    /// When that task is gone from view the row at the old position is taken.
    pub fn clamp_selection(&mut self) {
        let (position, len) = {
            let visible = self.visible();
            let position = self
                .selected
                .and_then(|id| visible.iter().position(|t| t.id == id));
            (position, visible.len())
        };
        match position {
            Some(i) => self.state.select(Some(i)),
            None if len == 0 => {
                self.selected = None;
                self.state.select(None);
            }
            None => {
                let i = self.state.selected().unwrap_or(0).min(len - 1);
                self.select(i);
            }
        }
    }

    /// Selects the next task.
    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.select(i);
    }

    /// Selects the previous task.
    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select(i);
    }

    /// Applies a mutation to the selected task, then saves and re-clamps.
    fn with_selected(&mut self, f: impl FnOnce(&mut CliTracker, u64)) {
        if let Some(id) = self.selected_id() {
            f(&mut self.tracker, id);
            self.persist();
            self.clamp_selection();
        }
    }

    pub fn start_selected(&mut self) {
        self.with_selected(|tracker, id| {
            tracker.start(id);
        });
    }

    pub fn pause_selected(&mut self) {
        self.with_selected(|tracker, id| {
            tracker.pause(id);
        });
    }

    pub fn stop_selected(&mut self) {
        self.with_selected(|tracker, id| {
            tracker.stop(id);
        });
    }

    pub fn complete_selected(&mut self) {
        self.with_selected(|tracker, id| {
            tracker.toggle_complete(id);
        });
    }

    pub fn delete_selected(&mut self) {
        self.with_selected(|tracker, id| {
            tracker.delete(id);
        });
    }

    /// Toggles the visibility of completed tasks.
    pub fn toggle_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.clamp_selection();
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_step = AddStep::Title;
        self.add_options = AddOptions::default();
        self.input_buffer.clear();
        self.message = None;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter in the "Add Task" wizard.
    pub fn handle_input(&mut self) {
        let value = self.input_buffer.trim().to_string();
        let opt = if value.is_empty() { None } else { Some(value.clone()) };
        let next = match self.add_step {
            AddStep::Title => {
                if value.is_empty() {
                    return;
                }
                self.add_options.title = value;
                Some(AddStep::Minutes)
            }
            AddStep::Minutes => match opt.map(|v| v.parse::<u32>()) {
                Some(Ok(m)) if m > 0 => {
                    self.add_options.minutes = Some(m);
                    Some(AddStep::Priority)
                }
                None => Some(AddStep::Priority),
                _ => return,
            },
            AddStep::Priority => match opt.map(|v| v.parse::<u8>()) {
                Some(Ok(p)) if (1..=5).contains(&p) => {
                    self.add_options.priority = Some(p);
                    Some(AddStep::Category)
                }
                None => Some(AddStep::Category),
                _ => return,
            },
            AddStep::Category => {
                self.add_options.category = opt;
                Some(AddStep::ShouldDoAt)
            }
            AddStep::ShouldDoAt => {
                self.add_options.should_do_at = opt;
                Some(AddStep::UsuallyDoAt)
            }
            AddStep::UsuallyDoAt => {
                self.add_options.usually_do_at = opt;
                Some(AddStep::AutoComplete)
            }
            AddStep::AutoComplete => {
                self.add_options.auto_complete = matches!(value.to_lowercase().as_str(), "y" | "yes");
                Some(AddStep::Recurrence)
            }
            AddStep::Recurrence => {
                let custom = opt.as_deref().map(str::to_lowercase).as_deref() == Some("custom");
                self.add_options.recur = opt;
                if custom { Some(AddStep::Days) } else { None }
            }
            AddStep::Days => {
                self.add_options.days = opt;
                None
            }
        };
        self.input_buffer.clear();
        match next {
            Some(step) => self.add_step = step,
            None => self.finish_add(),
        }
    }

    fn finish_add(&mut self) {
        self.input_mode = InputMode::Normal;
        let mut input = self.config.defaults.new_task(self.add_options.title.clone());
        if let Err(msg) = apply_options(&mut input, &self.add_options, self.tracker.now()) {
            self.message = Some(msg);
            return;
        }
        match self.tracker.add(input) {
            Some(id) => {
                self.message = Some(format!("Task added (id = {})", id));
                self.persist();
            }
            None => self.message = Some("Task not added".to_string()),
        }
        self.clamp_selection();
    }
}
