//! Host log window interface.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a host log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Information => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A message shown in the host's log window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub severity: Severity,
    pub text: String,
}

/// Sink for user-facing messages.
pub trait HostLog: Send + Sync {
    fn add_message(&self, severity: Severity, text: &str);
}

/// Host log that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: Mutex<Vec<LogMessage>>,
}

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages so far.
    #[must_use]
    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages.lock().clone()
    }

    /// Messages appended after the first `cursor` ones.
    #[must_use]
    pub fn messages_since(&self, cursor: usize) -> Vec<LogMessage> {
        self.messages.lock().iter().skip(cursor).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Returns `true` if any message of `severity` contains `needle`.
    #[must_use]
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.messages
            .lock()
            .iter()
            .any(|m| m.severity == severity && m.text.contains(needle))
    }
}

impl HostLog for MemoryLog {
    fn add_message(&self, severity: Severity, text: &str) {
        self.messages.lock().push(LogMessage {
            severity,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_since_skips_seen_entries() {
        let log = MemoryLog::new();
        log.add_message(Severity::Information, "one");
        log.add_message(Severity::Warning, "two");

        let fresh = log.messages_since(1);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].text, "two");
        assert!(log.contains(Severity::Warning, "tw"));
        assert!(!log.contains(Severity::Error, "two"));
    }
}
