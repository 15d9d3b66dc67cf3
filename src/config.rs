//! Startup options.

use std::env as stdenv;

/// Environment variable that turns on command tracing when set to `"1"`.
pub const TRACE_ENV_VAR: &str = "MARY_X";

/// Default input line limit in bytes, terminating newline included.
pub const DEFAULT_MAX_LINE: usize = 1024;

/// Session-wide settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Echo every expanded command line as `+ word word ...` before running it.
    pub trace: bool,
    /// Lines of this many bytes or more (newline included) are rejected.
    pub max_line: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            trace: false,
            max_line: DEFAULT_MAX_LINE,
        }
    }
}

impl Options {
    /// Defaults, with tracing taken from `MARY_X`.
    pub fn from_env() -> Self {
        let trace = trace_enabled(stdenv::var(TRACE_ENV_VAR).ok().as_deref());
        log::debug!("{TRACE_ENV_VAR} tracing: {trace}");
        Self {
            trace,
            ..Self::default()
        }
    }
}

fn trace_enabled(value: Option<&str>) -> bool {
    value == Some("1")
}
