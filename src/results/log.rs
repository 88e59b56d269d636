//! Newest-first entry log
//!
//! Entries are prepended and never mutated or removed individually;
//! clearing is all-or-nothing.

#![allow(dead_code)]

use std::collections::VecDeque;

use crate::models::ResultEntry;

/// Log of result entries produced by the sequencer
pub type ResultLog = EntryLog<ResultEntry>;

/// Append-only log, most recent entry first
#[derive(Clone, Debug)]
pub struct EntryLog<T> {
    entries: VecDeque<T>,
    capacity: Option<usize>,
}

impl<T: Clone> EntryLog<T> {
    /// Create an unbounded log
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: None,
        }
    }

    /// Create a log keeping at most `capacity` entries
    ///
    /// Once full, the oldest entry is evicted on each append.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Prepend an entry
    pub fn append(&mut self, entry: T) {
        self.entries.push_front(entry);
        if let Some(cap) = self.capacity {
            self.entries.truncate(cap);
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Ordered copy, newest first
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate newest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for EntryLog<T> {
    fn default() -> Self {
        Self::new()
    }
}
