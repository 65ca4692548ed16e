//! Output interception
//!
//! The program under test writes into an [`OutputInterceptor`]. Bytes are
//! assembled into lines and every completed line is judged right away,
//! on the writer's own call stack.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Weak;

use crate::common::{Failure, FailureKind};
use crate::script::command::{Channel, Context};
use crate::script::history::Event;

use super::Core;

/// Accumulates bytes until a line terminator shows up
#[derive(Debug, Default)]
pub(crate) struct LineAssembler {
    line: Vec<u8>,
}

impl LineAssembler {
    /// Feed one byte, returning the completed line on `\n`.
    ///
    /// The terminator is not part of the line and carriage returns right
    /// before it are dropped.
    pub(crate) fn push(&mut self, byte: u8) -> Option<String> {
        if byte != b'\n' {
            self.line.push(byte);
            return None;
        }

        let mut line = std::mem::take(&mut self.line);
        while line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    pub(crate) fn pending(&self) -> usize {
        self.line.len()
    }
}

impl Core {
    /// Judge one completed output line against the command at the cursor
    pub(crate) fn check_line(&mut self, line: String) -> Result<(), Failure> {
        self.history.record_event(&Event::Output(line.clone()));
        self.history.record_event(&Event::OutputTerminator);
        if self.write_log {
            tracing::trace!(target: "stdio_script::io", "[OUT]: {}(enter)", line);
        }

        let index = self.cursor;
        let Some(command) = self.commands.get(index) else {
            tracing::debug!(line = %line, "Discarding output past the end of the script");
            return Ok(());
        };

        match command.channel() {
            Channel::Output => {
                self.cursor += 1;
                let ctx = Context {
                    history: &self.history,
                    reporter: self.reporter.as_ref(),
                    verbose: self.verbose,
                };
                self.commands[index].validate_against(&line, &ctx)
            }
            Channel::Input => Err(self.reporter.fail(Failure::not_equal(
                FailureKind::ChannelOrder,
                &format!("[IN] {}", command.describe()),
                &format!("[OUT] {}", line),
                &self.history.render(),
            ))),
        }
    }

    /// Run a chunk of program output through the line assembler
    pub(crate) fn write_output(&mut self, buf: &[u8]) -> Result<(), Failure> {
        for &byte in buf {
            if let Some(line) = self.output.push(byte) {
                let verdict = self.check_line(line);
                self.remember(verdict)?;
            }
        }
        Ok(())
    }
}

/// Stand-in for the program's standard output
#[derive(Debug, Clone)]
pub struct OutputInterceptor {
    core: Weak<RefCell<Core>>,
}

impl OutputInterceptor {
    pub(crate) fn new(core: Weak<RefCell<Core>>) -> Self {
        Self { core }
    }
}

impl Write for OutputInterceptor {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let core = super::upgrade(&self.core)?;
        let mut core = super::borrow_active(&core)?;
        core.write_output(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
