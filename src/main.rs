use anyhow::{Context, Result};
use argh::FromArgs;
use mary_shell::{Interpreter, Options, Session};
use std::io::{self, IsTerminal};

#[derive(FromArgs)]
/// A tiny interactive command interpreter.
struct Args {
    #[argh(switch, short = 'x')]
    /// print each command line as `+ words...` before running it (same as MARY_X=1).
    trace: bool,

    #[argh(option)]
    /// maximum input line length in bytes, newline included.
    max_line: Option<usize>,

    #[argh(option, short = 'c')]
    /// run a single command line and exit. The line length limit does not apply.
    command: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = argh::from_env();

    let mut options = Options::from_env();
    options.trace |= args.trace;
    if let Some(max_line) = args.max_line {
        options.max_line = max_line;
    }
    log::debug!("starting with {options:?}");

    let mut sh = Interpreter::with_session(Session::new(options));

    if let Some(command) = args.command {
        let outcome = sh
            .run_line(command.as_bytes(), &mut io::stdout(), &mut io::stderr())
            .context("fatal error")?;
        log::debug!("command finished: {outcome:?}");
        return Ok(());
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        sh.repl()?;
    } else {
        sh.run_lines(stdin.lock(), &mut io::stdout(), &mut io::stderr())
            .context("fatal error")?;
    }

    Ok(())
}
