//! TOML-based configuration.
//!
//! Looked up at `<config_dir>/taskpulse/config.toml`; every field is optional.
//! `TASKPULSE_DB` and `TASKPULSE_LOG` override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{Category, NewTask};

pub const DB_ENV: &str = "TASKPULSE_DB";
pub const LOG_ENV: &str = "TASKPULSE_LOG";

/// Defaults applied to tasks created without explicit values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDefaults {
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub category: Category,
}

impl Default for TaskDefaults {
    fn default() -> Self {
        TaskDefaults {
            duration_minutes: default_duration(),
            priority: default_priority(),
            category: Category::default(),
        }
    }
}

impl TaskDefaults {
    /// An add-task input pre-filled with these defaults.
    pub fn new_task(&self, title: impl Into<String>) -> NewTask {
        NewTask {
            duration_minutes: self.duration_minutes,
            priority: self.priority,
            category: self.category,
            ..NewTask::titled(title)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Task snapshot file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Where the TUI writes its logs.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Ring the terminal bell on time-up and completion.
    #[serde(default = "default_true")]
    pub alerts: bool,
    #[serde(default)]
    pub defaults: TaskDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: default_data_file(),
            log_file: default_log_file(),
            log_filter: default_log_filter(),
            alerts: true,
            defaults: TaskDefaults::default(),
        }
    }
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Config::from_file(&path)?,
            _ => Config::default(),
        };
        if let Ok(db) = std::env::var(DB_ENV) {
            config.data_file = PathBuf::from(db);
        }
        if let Ok(filter) = std::env::var(LOG_ENV) {
            config.log_filter = filter;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(raw)
    }

    /// A config that keeps everything inside `dir`. Handy for tests.
    pub fn in_dir(dir: &Path) -> Config {
        Config {
            data_file: dir.join("tasks.json"),
            log_file: dir.join("taskpulse.log"),
            alerts: false,
            ..Config::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.duration_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "defaults.duration_minutes".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !(1..=5).contains(&self.defaults.priority) {
            return Err(ConfigError::InvalidValue {
                key: "defaults.priority".into(),
                message: format!("{} is outside 1..=5", self.defaults.priority),
            });
        }
        Ok(())
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("taskpulse").join("config.toml"))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskpulse")
}

fn default_data_file() -> PathBuf {
    data_dir().join("tasks.json")
}

fn default_log_file() -> PathBuf {
    data_dir().join("taskpulse.log")
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_duration() -> u32 {
    15
}

fn default_priority() -> u8 {
    3
}
