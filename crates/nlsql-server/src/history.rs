//! Bounded, most-recent-first record of successful conversions

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub natural_language: String,
    pub sql: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct QueryHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl QueryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Push to the front, dropping the oldest entries past capacity
    pub fn record(&mut self, natural_language: impl Into<String>, sql: impl Into<String>) {
        self.entries.push_front(HistoryEntry {
            natural_language: natural_language.into(),
            sql: sql.into(),
            timestamp: Local::now(),
        });
        self.entries.truncate(self.capacity);
    }

    /// Newest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
