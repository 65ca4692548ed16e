//! How failures reach the test
//!
//! The engine never decides on its own whether a divergence panics or
//! returns. It hands every [`Failure`] to a [`Reporter`]. A panicking
//! reporter suits plain `#[test]` functions; a returning reporter lets the
//! failure travel back through `io::Result` and `stop()`.

use crate::common::{Failure, FailureKind};

/// Test-failure collaborator
pub trait Reporter {
    /// Raise `failure`.
    ///
    /// Implementations either diverge or give the failure back so the
    /// engine can propagate it.
    fn fail(&self, failure: Failure) -> Failure;

    /// Raise a failure unless `expected == actual`
    fn assert_equal(
        &self,
        kind: FailureKind,
        expected: &str,
        actual: &str,
        message: &str,
    ) -> Result<(), Failure> {
        if expected == actual {
            return Ok(());
        }
        Err(self.fail(Failure::not_equal(kind, expected, actual, message)))
    }
}

/// Panics with the failure message (the default)
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl Reporter for PanicReporter {
    fn fail(&self, failure: Failure) -> Failure {
        panic!("{}", failure.message)
    }
}

/// Hands failures back as values
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorReporter;

impl Reporter for ErrorReporter {
    fn fail(&self, failure: Failure) -> Failure {
        failure
    }
}

impl<F> Reporter for F
where
    F: Fn(Failure) -> Failure,
{
    fn fail(&self, failure: Failure) -> Failure {
        self(failure)
    }
}
