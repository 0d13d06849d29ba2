use taskpulse::urgency::{compute_urgency, COMPLETED_SCORE};
use taskpulse::models::{NewTask, Task};
use taskpulse::store::TaskStore;
use chrono::{DateTime, Duration, Local, TimeZone};

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
}

fn make(input: NewTask) -> Task {
    let mut store = TaskStore::new();
    let id = store.add(input).unwrap();
    store.get(id).unwrap().clone()
}

#[test]
fn test_priority_base() {
    let task = make(NewTask { priority: 2, duration_minutes: 30, ..NewTask::titled("Test") });
    assert_eq!(compute_urgency(&task, now()), 40.0);
}

#[test]
fn test_due_exactly_now() {
    let task = make(NewTask {
        priority: 5,
        duration_minutes: 30,
        should_do_at: Some(now()),
        ..NewTask::titled("Test")
    });
    assert_eq!(compute_urgency(&task, now()), 200.0);

    let short = make(NewTask {
        priority: 5,
        duration_minutes: 10,
        should_do_at: Some(now()),
        ..NewTask::titled("Test")
    });
    assert_eq!(compute_urgency(&short, now()), 215.0);
}

#[test]
fn test_overdue_decays_by_half_point_per_minute() {
    let task = make(NewTask {
        priority: 1,
        duration_minutes: 30,
        should_do_at: Some(now() - Duration::minutes(60)),
        ..NewTask::titled("Test")
    });
    // 20 + (100 - 60 / 2)
    assert_eq!(compute_urgency(&task, now()), 90.0);

    let ancient = make(NewTask {
        priority: 1,
        duration_minutes: 30,
        should_do_at: Some(now() - Duration::days(2)),
        ..NewTask::titled("Test")
    });
    assert_eq!(compute_urgency(&ancient, now()), 20.0);
}

#[test]
fn test_upcoming_decays_by_quarter_point_per_minute() {
    let task = make(NewTask {
        priority: 1,
        duration_minutes: 30,
        should_do_at: Some(now() + Duration::minutes(100)),
        ..NewTask::titled("Test")
    });
    // 20 + (50 - 100 / 4)
    assert_eq!(compute_urgency(&task, now()), 45.0);
}

#[test]
fn test_usually_do_at_is_symmetric() {
    let before = make(NewTask {
        priority: 1,
        duration_minutes: 30,
        usually_do_at: Some(now() - Duration::minutes(60)),
        ..NewTask::titled("Test")
    });
    let after = make(NewTask {
        priority: 1,
        duration_minutes: 30,
        usually_do_at: Some(now() + Duration::minutes(60)),
        ..NewTask::titled("Test")
    });
    // 20 + (30 - 60 / 6)
    assert_eq!(compute_urgency(&before, now()), 40.0);
    assert_eq!(compute_urgency(&after, now()), 40.0);
}

#[test]
fn test_completed_sentinel() {
    let mut task = make(NewTask {
        priority: 5,
        duration_minutes: 5,
        should_do_at: Some(now()),
        usually_do_at: Some(now()),
        ..NewTask::titled("Test")
    });
    task.completed = true;
    assert_eq!(compute_urgency(&task, now()), COMPLETED_SCORE);
}
