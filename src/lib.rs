//! stdio-script - scripted stdin/stdout sessions for testing console programs
//!
//! A test describes the conversation it expects (lines the program should
//! print, lines a user would type) and hands the program a pair of channel
//! handles. Every line the program prints and every character it reads is
//! checked against that script, in order, as it happens.

pub mod cli;
pub mod commands;
pub mod common;
pub mod scenario;
pub mod script;
pub mod session;

// Re-export commonly used types for tests
pub use common::{Error, Failure, FailureKind, Result};
pub use scenario::Scenario;
pub use script::{Channel, Command};
pub use session::{
    Channels, ErrorReporter, InputSource, OutputInterceptor, PanicReporter, Reporter, Session,
};
