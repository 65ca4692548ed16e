//! Common utilities shared between the library and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Failure, FailureKind, Result};

/// Split text into expected lines the way a console would show them.
///
/// Each `\n` ends a line. A run of trailing line breaks yields exactly one
/// extra empty line, an empty input yields a single empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if text.ends_with('\n') {
        while lines.last() == Some(&"") {
            lines.pop();
        }
        lines.push("");
    }
    lines
}
