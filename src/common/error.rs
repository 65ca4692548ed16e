//! Error types for stdio-script
//!
//! Two families live here. [`Error`] covers everything that goes wrong
//! around a session: configuration, scenario files, lifecycle misuse and
//! plain I/O. [`Failure`] is a test verdict: the program under test did
//! something the script did not allow.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for stdio-script
#[derive(Error, Debug)]
pub enum Error {
    // === Session Errors ===
    #[error("Session already active. Call stop() before starting it again")]
    SessionAlreadyActive,

    #[error("Session was dropped while its channels were still in use")]
    SessionDropped,

    // === Verdicts ===
    #[error(transparent)]
    Failure(#[from] Failure),

    // === Scenario Errors ===
    #[error("Invalid scenario '{name}': {reason}")]
    InvalidScenario { name: String, reason: String },

    #[error("Unsupported scenario format '{0}'. Use .yaml, .yml or .json")]
    UnsupportedFormat(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create an invalid scenario error
    pub fn invalid_scenario(name: &str, reason: &str) -> Self {
        Self::InvalidScenario {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// What kind of divergence a [`Failure`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A line did not satisfy its OUTPUT command
    Mismatch,
    /// The program read when it should have written, or the reverse
    ChannelOrder,
    /// The program asked for more input than the script supplies
    Overrun,
    /// The program ended with commands still pending
    PrematureEnd,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mismatch => write!(f, "mismatch"),
            Self::ChannelOrder => write!(f, "channel order"),
            Self::Overrun => write!(f, "overrun"),
            Self::PrematureEnd => write!(f, "premature end"),
        }
    }
}

/// A failed expectation, carrying the exact diagnostic text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an "expected/actual" failure in the assertion format the
    /// diagnostics are written against:
    /// `<message> ==> expected: <E> but was: <A>`
    pub fn not_equal(kind: FailureKind, expected: &str, actual: &str, message: &str) -> Self {
        let comparison = format!("expected: <{}> but was: <{}>", expected, actual);
        let message = if message.is_empty() {
            comparison
        } else {
            format!("{} ==> {}", message, comparison)
        };
        Self { kind, message }
    }

    /// Recover a failure that travelled through an `io::Error`
    pub fn from_io(error: &io::Error) -> Option<&Failure> {
        error.get_ref().and_then(|inner| inner.downcast_ref::<Failure>())
    }
}

impl From<Failure> for io::Error {
    fn from(failure: Failure) -> Self {
        io::Error::other(failure)
    }
}
