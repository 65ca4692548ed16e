//! Scenario file types
//!
//! Defines the data structures for deserializing YAML/JSON scripts.

use serde::Deserialize;

use crate::common::config::DEFAULT_HISTORY_CAPACITY;

/// A complete scripted session loaded from a file
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of the interaction being verified
    pub description: Option<String>,
    /// Append recent I/O history to content mismatches
    #[serde(default = "default_verbose_errors")]
    pub verbose_errors: bool,
    /// Number of channel events kept for failure context
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// The ordered interaction
    pub steps: Vec<Step>,
}

fn default_verbose_errors() -> bool {
    true
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// A single scripted step
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Feed one line to the program
    Input {
        /// Text typed, without the line terminator
        text: String,
    },
    /// Expect one exact output line
    Output {
        /// Expected line, without the line terminator
        text: String,
    },
    /// Expect one output line containing a fixed substring
    Contains {
        /// Substring that must appear in the line
        text: String,
    },
    /// Accept a number of output lines without checking them
    Lines {
        /// How many lines to skip
        count: usize,
    },
    /// Expect several exact output lines, separated by `\n`
    MultiLine {
        /// Expected block; a trailing `\n` expects one more empty line
        text: String,
    },
}

impl Step {
    /// Short label used in listings
    pub fn action(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Output { .. } => "output",
            Self::Contains { .. } => "contains",
            Self::Lines { .. } => "lines",
            Self::MultiLine { .. } => "multi_line",
        }
    }
}
