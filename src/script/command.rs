//! Scripted commands
//!
//! A command is one expected interaction on one channel. The set of
//! behaviours is closed, so each variant carries its own payload and
//! validation is a single `match`.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::common::{Failure, FailureKind};
use crate::session::report::Reporter;

use super::history::History;

/// Which side of the conversation a command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Feeds the program (its stdin)
    Input,
    /// Consumed from the program (its stdout)
    Output,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "IN"),
            Self::Output => write!(f, "OUT"),
        }
    }
}

pub type Producer = Box<dyn Fn() -> String>;
pub type Predicate = Box<dyn Fn(&str) -> bool>;
pub type Transform = Box<dyn Fn(&str) -> String>;

/// One scripted expectation or input supply
pub enum Command {
    /// Fixed text
    Literal { channel: Channel, text: String },
    /// Text computed again every time it is resolved
    Produced { channel: Channel, producer: Producer },
    /// Output line accepted when the predicate holds
    Predicate(Predicate),
    /// Output line accepted when the transform maps it to itself
    Transform(Transform),
    /// Any single output line
    AnyLine,
}

/// What a command needs to judge a line
pub struct Context<'a> {
    pub history: &'a History,
    pub reporter: &'a dyn Reporter,
    pub verbose: bool,
}

impl Context<'_> {
    /// History block for content mismatches, empty unless verbose
    fn detail(&self) -> String {
        if self.verbose {
            self.history.render()
        } else {
            String::new()
        }
    }
}

impl Command {
    pub fn literal(channel: Channel, text: impl Into<String>) -> Self {
        Self::Literal {
            channel,
            text: text.into(),
        }
    }

    pub fn produced(channel: Channel, producer: impl Fn() -> String + 'static) -> Self {
        Self::Produced {
            channel,
            producer: Box::new(producer),
        }
    }

    pub fn predicate(predicate: impl Fn(&str) -> bool + 'static) -> Self {
        Self::Predicate(Box::new(predicate))
    }

    pub fn transform(transform: impl Fn(&str) -> String + 'static) -> Self {
        Self::Transform(Box::new(transform))
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::Literal { channel, .. } | Self::Produced { channel, .. } => *channel,
            Self::Predicate(_) | Self::Transform(_) | Self::AnyLine => Channel::Output,
        }
    }

    /// The text to emit or compare against.
    ///
    /// Producers run on every call. Closure checks have no text.
    pub fn resolved_text(&self) -> Option<String> {
        match self {
            Self::Literal { text, .. } => Some(text.clone()),
            Self::Produced { producer, .. } => Some(producer()),
            Self::AnyLine => Some(String::new()),
            Self::Predicate(_) | Self::Transform(_) => None,
        }
    }

    /// Human-readable form used in failure messages
    pub fn describe(&self) -> String {
        match self {
            Self::Predicate(_) => "<predicate>".to_string(),
            Self::Transform(_) => "<transform>".to_string(),
            _ => self.resolved_text().unwrap_or_default(),
        }
    }

    /// Check one completed output line against this command
    pub fn validate_against(&self, actual: &str, ctx: &Context<'_>) -> Result<(), Failure> {
        match self {
            Self::Literal { .. } | Self::Produced { .. } => {
                let expected = self.resolved_text().unwrap_or_default();
                ctx.reporter
                    .assert_equal(FailureKind::Mismatch, &expected, actual, &ctx.detail())
            }
            Self::Predicate(predicate) => {
                match panic::catch_unwind(AssertUnwindSafe(|| predicate(actual))) {
                    Ok(true) => Ok(()),
                    Ok(false) => {
                        let mut message =
                            format!("Output different from expected. Actual output: {}", actual);
                        if ctx.verbose {
                            message.push_str(". ");
                            message.push_str(&ctx.history.render());
                        }
                        Err(ctx.reporter.fail(Failure::new(FailureKind::Mismatch, message)))
                    }
                    Err(payload) => {
                        let mut message = panic_message(payload.as_ref());
                        if ctx.verbose {
                            message.push_str(". ");
                            message.push_str(&ctx.history.render());
                        }
                        Err(ctx.reporter.fail(Failure::new(FailureKind::Mismatch, message)))
                    }
                }
            }
            Self::Transform(transform) => {
                let result = transform(actual);
                ctx.reporter
                    .assert_equal(FailureKind::Mismatch, actual, &result, &ctx.detail())
            }
            Self::AnyLine => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "predicate panicked".to_string()
    }
}

impl PartialEq<str> for Command {
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::AnyLine => true,
            _ => self.resolved_text().as_deref() == Some(other),
        }
    }
}

impl PartialEq<&str> for Command {
    fn eq(&self, other: &&str) -> bool {
        <Self as PartialEq<str>>::eq(self, other)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { channel, text } => f
                .debug_struct("Literal")
                .field("channel", channel)
                .field("text", text)
                .finish(),
            Self::Produced { channel, .. } => f
                .debug_struct("Produced")
                .field("channel", channel)
                .finish_non_exhaustive(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Transform(_) => f.write_str("Transform(..)"),
            Self::AnyLine => f.write_str("AnyLine"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.channel(), self.describe())
    }
}
