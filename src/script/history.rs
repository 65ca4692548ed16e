//! Bounded history of channel events
//!
//! Only used to tell the reader what the program was doing right before a
//! failure. Entries are formatted when recorded so rendering is a join.

use std::collections::VecDeque;
use std::fmt;

/// One event on either channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A completed output line, without its terminator
    Output(String),
    /// The line terminator that completed an output line
    OutputTerminator,
    /// A completed input line, terminator implied
    Input(String),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(line) => write!(f, "[OUT]: {}(enter)", line),
            Self::OutputTerminator => write!(f, "[OUT]: (enter)"),
            Self::Input(line) => write!(f, "[IN]: {}(enter)", line),
        }
    }
}

/// Fixed-capacity ring of formatted events, oldest first
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one entry, evicting the oldest when full
    pub fn record(&mut self, entry: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    /// Append a channel event in its diagnostic format
    pub fn record_event(&mut self, event: &Event) {
        self.record(event.to_string());
    }

    /// Render the failure context block.
    ///
    /// Empty until something was recorded. The header names the buffer
    /// capacity, not the number of retained entries.
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut result = format!("Last {} lines were:\n", self.capacity);
        for entry in &self.entries {
            result.push_str(entry);
            result.push('\n');
        }
        result
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
