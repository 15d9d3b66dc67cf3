use crate::command::{CommandFactory, ExecutableCommand, Outcome};
use crate::env::Session;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::lexer::CommandLine;
use argh::{EarlyExit, FromArgs};
use std::io::Write;

/// Built-in commands known to the interpreter at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "set".
    fn name() -> &'static str;

    /// Executes the command against the session.
    fn execute(
        self,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<Outcome, ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<Outcome, ShellError> {
        <T as BuiltinCommand>::execute(*self, stdout, session)
    }
}

/// Stand-in for a builtin whose arguments did not parse; running it reports why.
struct InvalidArgs {
    command: &'static str,
    reason: String,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        _session: &mut Session,
    ) -> Result<Outcome, ShellError> {
        Err(ShellError::MalformedBuiltin {
            command: self.command,
            reason: self.reason,
        })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, line: &CommandLine) -> Option<Box<dyn ExecutableCommand>> {
        if line.program() != T::name() {
            return None;
        }
        let args: Vec<_> = line.args().iter().map(|t| t.to_str_lossy()).collect();
        // Everything after "--" is an operand, so `set A -1` works.
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push("--");
        operands.extend(args.iter().map(|a| &**a));
        Some(match T::from_args(&[T::name()], &operands) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, .. }) => Box::new(InvalidArgs {
                command: T::name(),
                reason: output.split_whitespace().collect::<Vec<_>>().join(" "),
            }),
        })
    }
}

#[derive(FromArgs)]
/// End the session. Any arguments are ignored.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _session: &mut Session,
    ) -> Result<Outcome, ShellError> {
        Ok(Outcome::Terminate)
    }
}

#[derive(FromArgs)]
/// Set a session variable, replacing any previous value.
pub struct Set {
    #[argh(positional)]
    /// name of the variable.
    pub name: String,

    #[argh(positional)]
    /// value to store.
    pub value: String,

    #[argh(positional, greedy)]
    /// extra words; ignored.
    pub _rest: Vec<String>,
}

impl BuiltinCommand for Set {
    fn name() -> &'static str {
        "set"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<Outcome, ShellError> {
        log::debug!("set {}={}", self.name, self.value);
        session.vars.set(self.name, self.value);
        Ok(Outcome::Continue)
    }
}

#[derive(FromArgs)]
/// List session variables as name=value, one per line.
pub struct Vars {}

impl BuiltinCommand for Vars {
    fn name() -> &'static str {
        "vars"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<Outcome, ShellError> {
        for var in session.vars.iter() {
            writeln!(stdout, "{}={}", var.name, var.value)?;
        }
        Ok(Outcome::Continue)
    }
}
