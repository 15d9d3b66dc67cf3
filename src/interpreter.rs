use crate::command::{CommandFactory, Outcome};
use crate::config::Options;
use crate::env::{Session, VariableStore};
use crate::error::ShellError;
use crate::expand::Expander;
use crate::lexer::CommandLine;
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};

const PROMPT: &str = "$ ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The command interpreter: tokenizes, expands and dispatches input lines.
///
/// The interpreter owns the [`Session`] and a list of [`CommandFactory`] objects
/// that are queried in order to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use mary_shell::{Interpreter, Outcome};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// sh.run_line(b"set GREETING hello", &mut out, &mut err).unwrap();
/// let outcome = sh.run_line(b"vars", &mut out, &mut err).unwrap();
/// assert_eq!(outcome, Outcome::Continue);
/// assert_eq!(String::from_utf8(out).unwrap(), "GREETING=hello\n");
/// ```
pub struct Interpreter {
    session: Session,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(session: Session, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { session, commands }
    }

    /// Create an interpreter with the standard commands around an existing session.
    pub fn with_session(session: Session) -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(
            session,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Set>::default()),
                Box::new(Factory::<Vars>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn vars(&self) -> &VariableStore {
        &self.session.vars
    }

    /// Route an expanded command line to the first factory that accepts its
    /// program name and run the resulting command to completion.
    pub fn dispatch(
        &mut self,
        line: &CommandLine,
        stdout: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(line) {
                log::debug!(
                    "dispatching {} with {} argument(s)",
                    line.program(),
                    line.args().len()
                );
                return cmd.execute(stdout, &mut self.session);
            }
        }
        // The default factories always end with the external launcher, so this
        // only happens with a custom factory list.
        Err(ShellError::Spawn {
            program: line.program().into_owned(),
            source: io::Error::new(io::ErrorKind::NotFound, "command not found"),
        })
    }

    /// Tokenize, expand, trace and dispatch one line. Errors are returned as-is.
    pub fn process_line(
        &mut self,
        line: &[u8],
        stdout: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        let Some(mut cmd) = CommandLine::parse(line)? else {
            return Ok(Outcome::Continue);
        };
        log::debug!("tokens: {:?}", cmd.tokens());

        Expander::new(&self.session.vars).expand_line(&mut cmd)?;

        if self.session.options.trace {
            stdout.write_all(b"+ ")?;
            stdout.write_all(&cmd.to_bytes())?;
            stdout.write_all(b"\n")?;
        }

        self.dispatch(&cmd, stdout)
    }

    /// Like [`Interpreter::process_line`], but reports recoverable errors on
    /// `stderr` and carries on. Only fatal errors are returned.
    pub fn run_line(
        &mut self,
        line: &[u8],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        let result = self.process_line(line, stdout);
        recover(result, stderr)
    }

    /// Run lines from a non-interactive source until end of input or `exit`.
    pub fn run_lines<R: BufRead>(
        &mut self,
        mut input: R,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                log::debug!("end of input");
                return Ok(());
            }
            // `buf` holds the newline only when one was read.
            let outcome = self.run_read_line(buf.len(), &buf, stdout, stderr)?;
            if outcome == Outcome::Terminate {
                return Ok(());
            }
        }
    }

    /// Interactive read-eval-print loop on the terminal.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new().context("failed to initialise line editor")?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        log_history_failure(rl.add_history_entry(line.as_str()));
                    }
                    let (mut stdout, mut stderr) = (io::stdout(), io::stderr());
                    let outcome = self.run_edited_line(&line, &mut stdout, &mut stderr)?;
                    if outcome == Outcome::Terminate {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("failed to read line"),
            }
        }

        Ok(())
    }

    /// Run a line from the line editor, which has already stripped the newline
    /// the user typed. That newline still counts towards the length limit.
    fn run_edited_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        self.run_read_line(line.len() + 1, line.as_bytes(), stdout, stderr)
    }

    fn run_read_line(
        &mut self,
        len: usize,
        line: &[u8],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        match self.check_length(len) {
            Ok(()) => self.run_line(line, stdout, stderr),
            Err(err) => recover(Err(err), stderr),
        }
    }

    /// Reject a line of `len` raw bytes (newline included, if any) that would
    /// not fit the input buffer.
    fn check_length(&self, len: usize) -> Result<(), ShellError> {
        let max = self.session.options.max_line;
        if len >= max {
            return Err(ShellError::LineTooLong { len, max });
        }
        Ok(())
    }
}

/// A history entry that cannot be recorded is logged and otherwise ignored.
fn log_history_failure(result: rustyline::Result<bool>) {
    if let Err(err) = result {
        log::warn!("failed to record history: {err}");
    }
}

/// Report a recoverable error on `stderr` and continue; pass fatal ones up.
fn recover(
    result: Result<Outcome, ShellError>,
    stderr: &mut dyn Write,
) -> Result<Outcome, ShellError> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(err) if err.is_fatal() => {
            log::error!("fatal: {err}");
            Err(err)
        }
        Err(err) => {
            writeln!(stderr, "mary: {err}")?;
            Ok(Outcome::Continue)
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with options from the environment and the standard
    /// commands:
    /// - built-ins: `exit`, `set`, `vars`
    /// - external command launcher
    fn default() -> Self {
        Self::with_session(Session::new(Options::from_env()))
    }
}
