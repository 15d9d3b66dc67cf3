use crate::env::Session;
use crate::error::ShellError;
use crate::lexer::CommandLine;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// What the driving loop should do after a command has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Read the next line.
    Continue,
    /// End the session.
    Terminate,
}

/// Object-safe trait for any command that can be executed by the interpreter.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command. Runs to completion before returning.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<Outcome, ShellError>;
}

/// Factory that tries to create a command from an expanded command line.
///
/// Returns `None` when the factory doesn't recognize the program name.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided command line.
    fn try_create(&self, line: &CommandLine) -> Option<Box<dyn ExecutableCommand>>;
}
