use taskpulse::commands::*;
use taskpulse::config::Config;
use taskpulse::error::TrackerError;
use chrono::{Duration, Local};
use taskpulse::models::{Category, NewTask, RecurringType};
use taskpulse::storage::{load_store, save_store};
use taskpulse::store::TaskStore;
use tempfile::TempDir;

// Every test gets its own data directory, so they can run in parallel.
fn with_test_db<F>(f: F)
where
    F: FnOnce(&Config),
{
    let dir = TempDir::new().unwrap();
    let config = Config::in_dir(dir.path());
    f(&config);
}

fn add(config: &Config, title: &str) -> u64 {
    let opts = AddOptions { title: title.into(), ..AddOptions::default() };
    cmd_add(config, opts, true).unwrap().unwrap()
}

#[test]
fn test_add_and_list() {
    with_test_db(|config| {
        let opts = AddOptions {
            title: "Book dentist".into(),
            minutes: Some(5),
            priority: Some(4),
            category: Some("appointment".into()),
            should_do_at: Some("2030-01-02 10:30".into()),
            ..AddOptions::default()
        };
        let id = cmd_add(config, opts, true).unwrap().unwrap();

        let store = load_store(&config.data_file).unwrap();
        assert_eq!(store.len(), 1);
        let task = store.get(id).unwrap();
        assert_eq!(task.title, "Book dentist");
        assert_eq!(task.duration_minutes, 5);
        assert_eq!(task.priority, 4);
        assert_eq!(task.category, Category::Appointment);
        assert!(task.should_do_at.is_some());

        cmd_list(config, true).unwrap();
    });
}

#[test]
fn test_add_uses_configured_defaults() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::in_dir(dir.path());
    config.defaults.duration_minutes = 25;
    config.defaults.category = Category::Routine;
    let id = add(&config, "Plan week");
    let store = load_store(&config.data_file).unwrap();
    let task = store.get(id).unwrap();
    assert_eq!(task.duration_minutes, 25);
    assert_eq!(task.priority, 3);
    assert_eq!(task.category, Category::Routine);
}

#[test]
fn test_blank_title_is_rejected() {
    with_test_db(|config| {
        let opts = AddOptions { title: "   ".into(), ..AddOptions::default() };
        assert_eq!(cmd_add(config, opts, true).unwrap(), None);
        assert!(!config.data_file.exists());
    });
}

#[test]
fn test_bad_time_is_rejected() {
    with_test_db(|config| {
        let opts = AddOptions {
            title: "Call mom".into(),
            usually_do_at: Some("after dinner".into()),
            ..AddOptions::default()
        };
        assert_eq!(cmd_add(config, opts, true).unwrap(), None);
    });
}

#[test]
fn test_recurring_add() {
    with_test_db(|config| {
        let opts = AddOptions {
            title: "Gym".into(),
            recur: Some("custom".into()),
            days: Some("mon,wed,fri".into()),
            ..AddOptions::default()
        };
        let id = cmd_add(config, opts, true).unwrap().unwrap();
        let store = load_store(&config.data_file).unwrap();
        let task = store.get(id).unwrap();
        assert!(task.is_recurring);
        assert_eq!(task.recurring_type, Some(RecurringType::Custom));
        assert_eq!(task.recurring_days, [1, 3, 5].into_iter().collect::<std::collections::BTreeSet<u8>>());
        assert_eq!(recurrence_label(task), "custom (Mon,Wed,Fri)");
    });
}

#[test]
fn test_start_switches_running_task() {
    with_test_db(|config| {
        let first = add(config, "Dishes");
        let second = add(config, "Laundry");

        cmd_start(config, first, true).unwrap();
        cmd_start(config, second, true).unwrap();

        let store = load_store(&config.data_file).unwrap();
        assert_eq!(store.running().map(|t| t.id), Some(second));
        assert!(!store.get(first).unwrap().is_running);
    });
}

#[test]
fn test_pause_and_stop() {
    with_test_db(|config| {
        let id = add(config, "Vacuum");
        cmd_start(config, id, true).unwrap();
        cmd_pause(config, id, true).unwrap();

        let store = load_store(&config.data_file).unwrap();
        let task = store.get(id).unwrap();
        assert!(!task.is_running);
        assert!(task.start_time.is_some());

        cmd_stop(config, id, true).unwrap();
        let store = load_store(&config.data_file).unwrap();
        let task = store.get(id).unwrap();
        assert_eq!(task.start_time, None);
        assert_eq!(task.elapsed_time_seconds, 0);
    });
}

#[test]
fn test_complete_toggles_and_blocks_start() {
    with_test_db(|config| {
        let id = add(config, "Water plants");
        cmd_start(config, id, true).unwrap();
        cmd_complete(config, id, true).unwrap();

        let store = load_store(&config.data_file).unwrap();
        let task = store.get(id).unwrap();
        assert!(task.completed);
        assert!(!task.is_running);

        cmd_start(config, id, true).unwrap();
        let store = load_store(&config.data_file).unwrap();
        assert!(store.running().is_none());

        cmd_complete(config, id, true).unwrap();
        let store = load_store(&config.data_file).unwrap();
        assert!(!store.get(id).unwrap().completed);
    });
}

#[test]
fn test_remove_task() {
    with_test_db(|config| {
        let id = add(config, "Old chore");
        cmd_remove(config, id, true).unwrap();
        assert!(load_store(&config.data_file).unwrap().is_empty());
        assert!(matches!(cmd_remove(config, id, true), Err(TrackerError::NotFound(_))));
    });
}

#[test]
fn test_unknown_id_is_not_found() {
    with_test_db(|config| {
        assert!(matches!(cmd_start(config, 42, true), Err(TrackerError::NotFound(42))));
        assert!(matches!(cmd_pause(config, 42, true), Err(TrackerError::NotFound(42))));
        assert!(matches!(cmd_stop(config, 42, true), Err(TrackerError::NotFound(42))));
        assert!(matches!(cmd_complete(config, 42, true), Err(TrackerError::NotFound(42))));
    });
}

#[test]
fn test_reset_deletes_snapshot() {
    with_test_db(|config| {
        add(config, "Temp");
        cmd_reset(config, true).unwrap();
        assert!(!config.data_file.exists());
    });
}

// A one-minute task started two minutes ago, plus a completed task.
fn seed_overrun(config: &Config) -> (u64, u64) {
    let mut store = TaskStore::new();
    let overrun = store
        .add(NewTask { duration_minutes: 1, ..NewTask::titled("Steep tea") })
        .unwrap();
    let done = store.add(NewTask::titled("Sweep")).unwrap();
    store.toggle_complete(done, Local::now().date_naive());
    store.start(overrun, Local::now() - Duration::minutes(2));
    save_store(&config.data_file, &store).unwrap();
    (overrun, done)
}

fn time_up_alerted(config: &Config, id: u64) -> bool {
    load_store(&config.data_file).unwrap().get(id).unwrap().time_up_alerted
}

#[test]
fn test_time_up_is_saved_when_add_is_rejected() {
    with_test_db(|config| {
        let (overrun, _) = seed_overrun(config);
        let opts = AddOptions { title: "  ".into(), ..AddOptions::default() };
        assert_eq!(cmd_add(config, opts, true).unwrap(), None);
        assert!(time_up_alerted(config, overrun));

        let store = load_store(&config.data_file).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.get(overrun).unwrap().elapsed_time_seconds >= 120);
    });
}

#[test]
fn test_time_up_is_saved_when_id_is_unknown() {
    with_test_db(|config| {
        let (overrun, _) = seed_overrun(config);
        assert!(matches!(cmd_pause(config, 999, true), Err(TrackerError::NotFound(999))));
        assert!(time_up_alerted(config, overrun));
    });
}

#[test]
fn test_time_up_is_saved_when_start_is_refused() {
    with_test_db(|config| {
        let (overrun, done) = seed_overrun(config);
        cmd_start(config, done, true).unwrap();
        assert!(time_up_alerted(config, overrun));
        let store = load_store(&config.data_file).unwrap();
        assert_eq!(store.running().map(|t| t.id), Some(overrun));
    });
}
