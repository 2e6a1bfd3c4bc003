use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};

/// A statement captured by the [`QueryLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedQuery {
    pub executed_at: DateTime<Utc>,
    pub sql: String,
}

impl fmt::Display for LoggedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.executed_at.format("%H:%M:%S%.3f"), self.sql)
    }
}

/// Shared log of executed statements, kept while debug mode is on
#[derive(Clone, Default)]
pub struct QueryLog {
    entries: Arc<Mutex<Vec<LoggedQuery>>>,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a statement
    pub fn record(&self, sql: impl Into<String>) {
        let entry = LoggedQuery {
            executed_at: Utc::now(),
            sql: sql.into(),
        };

        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    /// Statements in execution order
    pub fn statements(&self) -> Vec<String> {
        if let Ok(entries) = self.entries.lock() {
            entries.iter().map(|entry| entry.sql.clone()).collect()
        } else {
            Vec::new()
        }
    }

    /// Timestamped entries sorted by date (newest first)
    pub fn entries(&self) -> Vec<LoggedQuery> {
        if let Ok(entries) = self.entries.lock() {
            let mut sorted = entries.clone();
            sorted.reverse();
            sorted
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all recorded statements
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
