//! Game-facing event log.
//!
//! Every meaningful event (damage dealt, effect applied, level-up, defeat,
//! rejected action) becomes a [`LogLine`] with a [`Severity`] tag. Lines are
//! observational only: nothing in the engine reads them back.

use serde::{Deserialize, Serialize};

/// How the UI should colour a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Bad,
    Muted,
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub text: String,
    pub severity: Severity,
}

impl LogLine {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self { text: text.into(), severity }
    }

    pub fn good(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Good)
    }

    pub fn bad(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Bad)
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Muted)
    }

    pub fn neutral(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Neutral)
    }
}

/// External collector of log lines.
pub trait LogSink {
    fn push(&mut self, line: LogLine);
}

impl LogSink for Vec<LogLine> {
    fn push(&mut self, line: LogLine) {
        Vec::push(self, line);
    }
}

/// Max lines retained by [`GameLog`].
pub const LOG_CAPACITY: usize = 30;

/// Bounded log kept by the game facade (oldest lines dropped first).
#[derive(Clone, Debug, Default)]
pub struct GameLog {
    lines: Vec<LogLine>,
}

impl GameLog {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.last()
    }
}

impl LogSink for GameLog {
    fn push(&mut self, line: LogLine) {
        match line.severity {
            Severity::Bad => tracing::debug!(text = %line.text, "rejected"),
            _ => tracing::trace!(text = %line.text, severity = ?line.severity, "log"),
        }
        self.lines.push(line);
        if self.lines.len() > LOG_CAPACITY {
            self.lines.remove(0);
        }
    }
}
