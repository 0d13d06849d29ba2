//! The tracker ties the store, the clock and the alert emitter together.
//!
//! A tick runs two passes in a fixed order: recurring tasks whose schedule
//! rolled over are reopened first, then the running task's timer is advanced.
//! User actions take `&mut self`, so they can never land in the middle of a tick.

use chrono::{DateTime, Local};
use tracing::debug;

use crate::alert::{AlertEmitter, AlertKind};
use crate::clock::{local_day, Clock};
use crate::models::{NewTask, Task};
use crate::ranking::rank;
use crate::recurrence::reset_due;
use crate::store::TaskStore;
use crate::timer::advance_running;

/// What one tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub resets: usize,
    pub alerts: usize,
    pub auto_completed: usize,
}

impl TickReport {
    /// Whether the tick changed anything worth persisting.
    pub fn changed_state(&self) -> bool {
        self.resets > 0 || self.alerts > 0 || self.auto_completed > 0
    }
}

pub struct Tracker<C: Clock, A: AlertEmitter> {
    store: TaskStore,
    clock: C,
    alerts: A,
}

impl<C: Clock, A: AlertEmitter> Tracker<C, A> {
    pub fn new(store: TaskStore, clock: C, alerts: A) -> Self {
        Tracker { store, clock, alerts }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// One pass of the periodic pipeline.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let resets = reset_due(&mut self.store, local_day(now));
        let (alerts, auto_completed) = advance_running(&mut self.store, now, &mut self.alerts);
        let report = TickReport { resets, alerts, auto_completed };
        if report.changed_state() {
            debug!(?report, "tick changed state");
        }
        report
    }

    /// Tasks in display order at the current instant.
    pub fn ranked(&self) -> Vec<&Task> {
        rank(self.store.tasks(), self.clock.now())
    }

    pub fn add(&mut self, input: NewTask) -> Option<u64> {
        self.store.add(input)
    }

    pub fn start(&mut self, id: u64) -> bool {
        let now = self.clock.now();
        self.store.start(id, now)
    }

    pub fn pause(&mut self, id: u64) -> bool {
        self.store.pause(id)
    }

    pub fn stop(&mut self, id: u64) -> bool {
        self.store.stop(id)
    }

    /// Flips completion. Finishing a task by hand plays the completion alert.
    pub fn toggle_complete(&mut self, id: u64) -> Option<bool> {
        let today = local_day(self.clock.now());
        let completed = self.store.toggle_complete(id, today)?;
        if completed {
            self.alerts.emit(AlertKind::Completion);
        }
        Some(completed)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        self.store.delete(id)
    }
}
