//! Sandbox-to-host messages and the bounded log feed they land in.

use crate::error::Ex33Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Log feed capacity; older entries are dropped silently.
pub const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Event,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Event => "event",
        };
        f.write_str(s)
    }
}

/// Payload posted by the instrumentation script inside the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SandboxMessage {
    Log { level: LogLevel, message: String },
}

impl SandboxMessage {
    /// Decodes a `postMessage` payload serialized as JSON.
    pub fn parse(raw: &str) -> Ex33Result<SandboxMessage> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub time: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self::at(level, message, Utc::now())
    }

    pub fn at(level: LogLevel, message: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            level,
            message: message.into(),
            time,
        }
    }
}

impl From<SandboxMessage> for LogEntry {
    fn from(msg: SandboxMessage) -> Self {
        match msg {
            SandboxMessage::Log { level, message } => LogEntry::new(level, message),
        }
    }
}

/// Append-only ring buffer, newest first.
#[derive(Debug, Clone, Default)]
pub struct LogFeed {
    entries: VecDeque<LogEntry>,
    pushed: u64,
}

impl LogFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(LOG_CAPACITY);
        self.pushed += 1;
    }

    /// Entries ever pushed, including ones already dropped. Lets a consumer
    /// tell which entries it has not seen yet.
    pub fn total_pushed(&self) -> u64 {
        self.pushed
    }

    /// Entries pushed after the feed had `seen_total` pushes, oldest first.
    pub fn since(&self, seen_total: u64) -> impl Iterator<Item = &LogEntry> {
        let fresh = self.pushed.saturating_sub(seen_total).min(self.entries.len() as u64) as usize;
        self.entries.iter().take(fresh).rev()
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push(LogEntry::new(level, message));
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
