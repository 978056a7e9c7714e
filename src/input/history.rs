use std::collections::VecDeque;

use crate::config::DEFAULT_HISTORY_CAPACITY;

/// Bounded stack of submitted command lines.
///
/// Entries are owned copies of what the user typed; index 0 of the backing
/// deque is the oldest entry and the back is the top.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        HistoryStack {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_owned());
    }

    pub fn peek(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Entry `distance` steps below the top, clamped to the oldest entry.
    pub fn recall(&self, distance: usize) -> Option<&str> {
        let last = self.entries.len().checked_sub(1)?;
        let index = last - distance.min(last);
        self.entries.get(index).map(String::as_str)
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

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
