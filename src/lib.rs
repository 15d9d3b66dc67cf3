//! A tiny interactive command interpreter.
//!
//! Each input line is split into words, `$name` / `${name}` references are
//! substituted from a session variable table (falling back to the process
//! environment), and the resulting command line is routed either to one of the
//! builtins (`exit`, `set`, `vars`) or to an external program.
//!
//! The main entry point is [`Interpreter`]. The public modules expose the
//! individual stages so they can be used and tested on their own: [`lexer`]
//! splits lines, [`expand`] substitutes references, [`env`] holds the session
//! state and [`command`] defines the traits the dispatcher works with.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod expand;
pub mod external;
mod interpreter;
pub mod lexer;

pub use command::Outcome;
pub use config::Options;
pub use env::{Session, VariableStore};
pub use error::{ExpansionError, ShellError};
/// Just a convenient re-export of the command interpreter.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
