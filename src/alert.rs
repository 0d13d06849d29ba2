//! Audible alerts raised by the timer.
//!
//! The core only asks for a kind of alert; how it sounds is up to the emitter.
//! Emitters never report failure back: they log it and move on, so a broken
//! terminal or muted device cannot interrupt a tick.

use std::io::{self, Write};

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// A non-auto-complete task ran out of planned time.
    TimeUp,
    /// A task was completed, automatically or by hand.
    Completion,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::TimeUp => "time-up",
            AlertKind::Completion => "completion",
        }
    }
}

pub trait AlertEmitter {
    fn emit(&mut self, kind: AlertKind);
}

impl<A: AlertEmitter + ?Sized> AlertEmitter for Box<A> {
    fn emit(&mut self, kind: AlertKind) {
        (**self).emit(kind)
    }
}

/// Rings the terminal bell: one ring for time-up, two for completion.
pub struct TerminalBell<W: Write = io::Stdout> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        TerminalBell { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        TerminalBell { out }
    }

    fn ring(&mut self, kind: AlertKind) -> io::Result<()> {
        let bells: &[u8] = match kind {
            AlertKind::TimeUp => b"\x07",
            AlertKind::Completion => b"\x07\x07",
        };
        self.out.write_all(bells)?;
        self.out.flush()
    }
}

impl<W: Write> AlertEmitter for TerminalBell<W> {
    fn emit(&mut self, kind: AlertKind) {
        if let Err(e) = self.ring(kind) {
            warn!(alert = kind.as_str(), error = %e, "failed to ring terminal bell");
        }
    }
}

/// Drops every alert. Used when alerts are disabled in the config.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlerts;

impl AlertEmitter for SilentAlerts {
    fn emit(&mut self, kind: AlertKind) {
        debug!(alert = kind.as_str(), "alert suppressed");
    }
}

/// Remembers every alert it was asked to emit.
#[derive(Debug, Default, Clone)]
pub struct RecordingAlerts {
    pub emitted: Vec<AlertKind>,
}

impl RecordingAlerts {
    pub fn count(&self, kind: AlertKind) -> usize {
        self.emitted.iter().filter(|k| **k == kind).count()
    }
}

impl AlertEmitter for RecordingAlerts {
    fn emit(&mut self, kind: AlertKind) {
        self.emitted.push(kind);
    }
}
