//! Input simulation
//!
//! The program under test reads from an [`InputSource`]. Each INPUT
//! command is served as one line: its characters, then a synthesized
//! `\n`, after which the cursor moves on. There is no end-of-file; a read
//! the script did not plan for is a failure.

use std::cell::RefCell;
use std::io::{self, BufRead, Read};
use std::rc::Weak;

use crate::common::{Failure, FailureKind};
use crate::script::command::Channel;
use crate::script::history::Event;

use super::Core;

/// Per-line read state of the input side
#[derive(Debug, Default)]
pub(crate) struct InputState {
    /// Text of the line being served, resolved when the line started.
    ///
    /// A producer-backed command is called once per line, not once per
    /// character, so a line can never mix the output of two calls.
    line: Option<String>,
    /// Byte offset of the next character within `line`
    offset: usize,
    /// Characters served so far on this line
    pending: String,
}

impl InputState {
    pub(crate) fn is_mid_line(&self) -> bool {
        self.line.is_some()
    }
}

impl Core {
    /// Serve the next character of the current INPUT command
    pub(crate) fn next_input_char(&mut self) -> Result<char, Failure> {
        let verdict = self.serve_char();
        self.remember(verdict)
    }

    fn serve_char(&mut self) -> Result<char, Failure> {
        let Some(command) = self.commands.get(self.cursor) else {
            return Err(self.reporter.fail(Failure::new(
                FailureKind::Overrun,
                format!(
                    "You have an extra [IN] that is not needed. {}",
                    self.history.render()
                ),
            )));
        };

        if command.channel() != Channel::Input {
            return Err(self.reporter.fail(Failure::not_equal(
                FailureKind::ChannelOrder,
                &format!("[OUT] {}", command.describe()),
                "[IN] ...",
                &self.history.render(),
            )));
        }

        if self.input.line.is_none() {
            self.input.line = Some(command.resolved_text().unwrap_or_default());
        }
        let text = self.input.line.as_deref().unwrap_or_default();

        if let Some(ch) = text[self.input.offset..].chars().next() {
            self.input.offset += ch.len_utf8();
            self.input.pending.push(ch);
            if self.write_log {
                tracing::trace!(target: "stdio_script::io", "[IN]: {}", ch);
            }
            return Ok(ch);
        }

        self.cursor += 1;
        self.input.line = None;
        self.input.offset = 0;
        let line = std::mem::take(&mut self.input.pending);
        self.history.record_event(&Event::Input(line));
        if self.write_log {
            tracing::trace!(target: "stdio_script::io", "[IN]: (enter)");
        }
        Ok('\n')
    }
}

/// Stand-in for the program's standard input
///
/// Characters are pulled from the session one at a time, so the cursor
/// only moves past an INPUT command once the program has actually read
/// its terminator.
pub struct InputSource {
    core: Weak<RefCell<Core>>,
    staged: Vec<u8>,
    pos: usize,
}

impl InputSource {
    pub(crate) fn new(core: Weak<RefCell<Core>>) -> Self {
        Self {
            core,
            staged: Vec::with_capacity(4),
            pos: 0,
        }
    }

    fn stage_next(&mut self) -> io::Result<()> {
        let core = super::upgrade(&self.core)?;
        let mut core = super::borrow_active(&core)?;
        let ch = core.next_input_char()?;

        let mut encoded = [0u8; 4];
        self.staged.clear();
        self.staged
            .extend_from_slice(ch.encode_utf8(&mut encoded).as_bytes());
        self.pos = 0;
        Ok(())
    }
}

impl std::fmt::Debug for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSource")
            .field("staged", &&self.staged[self.pos..])
            .finish_non_exhaustive()
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let available = self.fill_buf()?;
            let n = available.len().min(buf.len() - filled);
            buf[filled..filled + n].copy_from_slice(&available[..n]);
            self.consume(n);
            filled += n;

            if buf[filled - 1] == b'\n' && self.pos == self.staged.len() {
                break;
            }
        }
        Ok(filled)
    }
}

impl BufRead for InputSource {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.staged.len() {
            self.stage_next()?;
        }
        Ok(&self.staged[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.staged.len());
    }
}
