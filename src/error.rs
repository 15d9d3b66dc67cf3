//! Error types for the interpreter.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Failures while substituting variable references inside a word.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// `${` without a matching `}` before the end of the word.
    #[error("unclosed ${{ in variable reference")]
    UnterminatedBrace,

    /// `$` not followed by a name, or `${}`.
    #[error("must have variable name after $")]
    EmptyName,

    /// The name is neither a session variable nor set in the environment.
    #[error("variable {0} was not found")]
    Undefined(String),
}

/// Everything that can go wrong while handling one input line.
///
/// Only [`ShellError::Allocation`] is fatal; every other variant is reported and
/// the session moves on to the next line.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("failed to allocate: {0}")]
    Allocation(#[from] TryReserveError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    /// Wrong arguments for a builtin.
    #[error("{command}: {reason}")]
    MalformedBuiltin {
        command: &'static str,
        reason: String,
    },

    /// The external program could not be started.
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("line too long ({len} bytes, limit is {max})")]
    LineTooLong { len: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Whether the session can no longer continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Allocation(_))
    }
}
