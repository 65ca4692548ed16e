//! Scripted console session
//!
//! A [`Session`] owns the command queue and the cursor shared by both
//! channels. The program under test gets the channel handles from
//! [`Session::start`] (or runs inside [`Session::run`]) and talks to them
//! as it would to stdin/stdout; every line it prints and every line it
//! reads is checked against the script in order.
//!
//! ```no_run
//! use std::io::{BufRead, Write};
//! use stdio_script::Session;
//!
//! let mut session = Session::new()
//!     .expect_output("What is your name?")
//!     .simulate_input("Alice")
//!     .expect_output("Hello, Alice!");
//!
//! session
//!     .run(|stdin, stdout| {
//!         writeln!(stdout, "What is your name?")?;
//!         let mut name = String::new();
//!         stdin.read_line(&mut name)?;
//!         writeln!(stdout, "Hello, {}!", name.trim_end())
//!     })
//!     .unwrap()
//!     .unwrap();
//! ```

pub mod input;
pub mod output;
pub mod report;

use std::cell::{RefCell, RefMut};
use std::io;
use std::rc::{Rc, Weak};

use crate::common::config::{Config, SessionConfig, DEFAULT_HISTORY_CAPACITY};
use crate::common::{split_lines, Error, Failure, FailureKind, Result};
use crate::script::command::{Channel, Command};
use crate::script::history::History;

pub use input::InputSource;
pub use output::OutputInterceptor;
pub use report::{ErrorReporter, PanicReporter, Reporter};

use input::InputState;
use output::LineAssembler;

/// State shared by the session and its channel handles
pub(crate) struct Core {
    commands: Vec<Command>,
    cursor: usize,
    history: History,
    verbose: bool,
    write_log: bool,
    active: bool,
    reporter: Box<dyn Reporter>,
    output: LineAssembler,
    input: InputState,
    /// First failure handed back by a non-panicking reporter
    raised: Option<Failure>,
}

impl Core {
    /// Keep the first returned failure so `stop()` can report it even if
    /// the program swallowed the I/O error.
    pub(crate) fn remember<T>(
        &mut self,
        verdict: std::result::Result<T, Failure>,
    ) -> std::result::Result<T, Failure> {
        if let Err(failure) = &verdict {
            tracing::debug!(kind = %failure.kind, cursor = self.cursor, "Script failure");
            if self.raised.is_none() {
                self.raised = Some(failure.clone());
            }
        }
        verdict
    }

    fn deactivate(&mut self) {
        if self.active {
            tracing::debug!(
                cursor = self.cursor,
                total = self.commands.len(),
                "Session deactivated"
            );
        }
        self.active = false;
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("commands", &self.commands)
            .field("cursor", &self.cursor)
            .field("active", &self.active)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

fn upgrade(core: &Weak<RefCell<Core>>) -> io::Result<Rc<RefCell<Core>>> {
    core.upgrade()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, Error::SessionDropped))
}

fn borrow_active(core: &RefCell<Core>) -> io::Result<RefMut<'_, Core>> {
    let core = core.try_borrow_mut().map_err(|_| {
        io::Error::new(
            io::ErrorKind::WouldBlock,
            "session channel used re-entrantly from a script callback",
        )
    })?;
    if !core.active {
        return Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "session is not active; call start() first",
        ));
    }
    Ok(core)
}

/// The channel handles handed to the program under test
#[derive(Debug)]
pub struct Channels {
    pub stdin: InputSource,
    pub stdout: OutputInterceptor,
}

/// Deactivates the session when dropped, whatever the exit path
struct ActiveGuard(Rc<RefCell<Core>>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if let Ok(mut core) = self.0.try_borrow_mut() {
            core.deactivate();
        }
    }
}

/// Scripted interaction with a console program
#[derive(Debug)]
pub struct Session {
    core: Rc<RefCell<Core>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Verbose errors, default history capacity, panicking reporter
    pub fn new() -> Self {
        Self::with_options(true, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_options(verbose_errors: bool, history_capacity: usize) -> Self {
        Self {
            core: Rc::new(RefCell::new(Core {
                commands: Vec::new(),
                cursor: 0,
                history: History::new(history_capacity),
                verbose: verbose_errors,
                write_log: false,
                active: false,
                reporter: Box::new(PanicReporter),
                output: LineAssembler::default(),
                input: InputState::default(),
                raised: None,
            })),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::with_options(config.verbose_errors, config.history_capacity)
            .write_log(config.write_log)
    }

    /// Session configured from `$STDIO_SCRIPT_CONFIG` or the platform
    /// config file, falling back to [`Session::new`] settings
    pub fn from_default_config() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::from_config(&config.session))
    }

    /// Choose how failures are raised
    pub fn reporter(self, reporter: impl Reporter + 'static) -> Self {
        self.core.borrow_mut().reporter = Box::new(reporter);
        self
    }

    /// Trace every exchanged character and line under `stdio_script::io`
    pub fn write_log(self, enabled: bool) -> Self {
        self.core.borrow_mut().write_log = enabled;
        self
    }

    fn push(self, command: Command) -> Self {
        {
            let mut core = self.core.borrow_mut();
            assert!(
                !core.active,
                "commands cannot be added to a running session: {}",
                command
            );
            core.commands.push(command);
        }
        self
    }

    /// Supply one line of keyboard input
    pub fn simulate_input(self, text: impl Into<String>) -> Self {
        self.push(Command::literal(Channel::Input, text))
    }

    /// Supply one line of keyboard input computed when the program reads it
    pub fn simulate_input_with(self, producer: impl Fn() -> String + 'static) -> Self {
        self.push(Command::produced(Channel::Input, producer))
    }

    /// Expect one exact output line
    pub fn expect_output(self, text: impl Into<String>) -> Self {
        self.push(Command::literal(Channel::Output, text))
    }

    /// Expect one output line equal to a value computed at check time
    pub fn expect_output_with(self, producer: impl Fn() -> String + 'static) -> Self {
        self.push(Command::produced(Channel::Output, producer))
    }

    /// Expect one output line that `transform` maps to itself
    pub fn expect_output_transformed(self, transform: impl Fn(&str) -> String + 'static) -> Self {
        self.push(Command::transform(transform))
    }

    /// Expect one output line satisfying `predicate`
    pub fn match_output(self, predicate: impl Fn(&str) -> bool + 'static) -> Self {
        self.push(Command::predicate(predicate))
    }

    /// Accept the next `count` output lines, whatever they contain
    pub fn expect_n_lines(self, count: usize) -> Self {
        (0..count).fold(self, |session, _| session.push(Command::AnyLine))
    }

    /// Expect several output lines at once, one per `\n`-separated line.
    ///
    /// A trailing line break expects one more, empty, line.
    pub fn expect_multi_line_output(self, text: &str) -> Self {
        split_lines(text)
            .into_iter()
            .fold(self, |session, line| session.expect_output(line))
    }

    /// Activate interception and hand out the channels
    pub fn start(&self) -> Result<Channels> {
        {
            let mut core = self.core.borrow_mut();
            if core.active {
                return Err(Error::SessionAlreadyActive);
            }
            core.active = true;
            tracing::debug!(
                commands = core.commands.len(),
                cursor = core.cursor,
                "Session started"
            );
        }
        Ok(Channels {
            stdin: self.stdin(),
            stdout: self.stdout(),
        })
    }

    /// Deactivate interception and check that the whole script was played.
    ///
    /// Reports, in this order, a failure already returned to the program
    /// and then any command still pending.
    pub fn stop(&self) -> std::result::Result<(), Failure> {
        let mut core = self.core.borrow_mut();
        core.deactivate();

        if core.output.pending() > 0 {
            tracing::warn!(
                bytes = core.output.pending(),
                "Program output ends without a line terminator; partial line not checked"
            );
        }
        if core.input.is_mid_line() {
            tracing::debug!("Program stopped in the middle of an input line");
        }

        if let Some(failure) = core.raised.take() {
            return Err(failure);
        }

        if let Some(command) = core.commands.get(core.cursor) {
            let message = format!(
                "Program finished too early. It should have printed '{}'. {}",
                command.describe(),
                core.history.render()
            );
            return Err(core
                .reporter
                .fail(Failure::new(FailureKind::PrematureEnd, message)));
        }

        Ok(())
    }

    /// Run `program` against the script between `start` and `stop`.
    ///
    /// The session is deactivated on every exit path, including a panic
    /// inside `program`. The program's own return value is passed through.
    pub fn run<T>(
        &mut self,
        program: impl FnOnce(&mut InputSource, &mut OutputInterceptor) -> T,
    ) -> Result<T> {
        let Channels {
            mut stdin,
            mut stdout,
        } = self.start()?;
        let _guard = ActiveGuard(Rc::clone(&self.core));

        let value = program(&mut stdin, &mut stdout);
        self.stop()?;
        Ok(value)
    }

    /// A fresh input handle on this session
    pub fn stdin(&self) -> InputSource {
        InputSource::new(Rc::downgrade(&self.core))
    }

    /// A fresh output handle on this session
    pub fn stdout(&self) -> OutputInterceptor {
        OutputInterceptor::new(Rc::downgrade(&self.core))
    }

    /// Index of the next unmet command
    pub fn cursor(&self) -> usize {
        self.core.borrow().cursor
    }

    /// Number of scripted commands
    pub fn len(&self) -> usize {
        self.core.borrow().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.borrow().commands.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.core.borrow().active
    }

    /// The rendered history block, as it would appear in a failure
    pub fn history_context(&self) -> String {
        self.core.borrow().history.render()
    }

    /// Visit the scripted commands in order
    pub fn for_each_command(&self, mut visit: impl FnMut(usize, &Command)) {
        for (i, command) in self.core.borrow().commands.iter().enumerate() {
            visit(i, command);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Ok(mut core) = self.core.try_borrow_mut() {
            if core.active {
                tracing::warn!(
                    "Session dropped while active; channels released without completion check"
                );
            }
            core.deactivate();
        }
    }
}
