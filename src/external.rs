use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Outcome};
use crate::env::Session;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::lexer::CommandLine;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitStatus;

/// Runs a program with an argument vector and waits for it to finish.
///
/// `argv[0]` is the program name, looked up in `PATH` when it has no slash.
/// Implementations block until the program exits; there is no timeout.
pub trait ProcessLauncher {
    fn launch(&mut self, argv: &[OsString]) -> io::Result<ExitCode>;
}

/// Launches real child processes that inherit the interpreter's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&mut self, argv: &[OsString]) -> io::Result<ExitCode> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector")
        })?;
        let exit_status = std::process::Command::new(program).args(args).status()?;
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

/// Command that is not a builtin.
pub struct ExternalCommand {
    argv: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(argv: Vec<OsString>) -> Self {
        Self { argv }
    }
}

/// Accepts every name, so it must be queried last.
impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(&self, line: &CommandLine) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(line.argv())))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<Outcome, ShellError> {
        // Anything we printed must reach the terminal before the child writes.
        stdout.flush()?;

        let program = self.argv[0].to_string_lossy();
        match session.launcher_mut().launch(&self.argv) {
            Ok(0) => log::debug!("{program} exited successfully"),
            Ok(code) => log::warn!("{program} exited with status {code}"),
            Err(source) => {
                return Err(ShellError::Spawn {
                    program: program.into_owned(),
                    source,
                });
            }
        }
        Ok(Outcome::Continue)
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::env::VariableStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<Vec<OsString>>>>;

    struct Recording {
        calls: Calls,
        result: fn() -> io::Result<ExitCode>,
    }

    impl ProcessLauncher for Recording {
        fn launch(&mut self, argv: &[OsString]) -> io::Result<ExitCode> {
            self.calls.borrow_mut().push(argv.to_vec());
            (self.result)()
        }
    }

    fn session_with(result: fn() -> io::Result<ExitCode>) -> (Session, Calls) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let launcher = Recording {
            calls: calls.clone(),
            result,
        };
        let session = Session::with_launcher(
            Options::default(),
            VariableStore::isolated(),
            Box::new(launcher),
        );
        (session, calls)
    }

    fn os_args(words: &[&str]) -> Vec<OsString> {
        words.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_factory_builds_full_argv() {
        let (mut session, calls) = session_with(|| Ok(0));
        let line = CommandLine::parse("echo hi there").unwrap().unwrap();
        let cmd = Factory::<ExternalCommand>::default().try_create(&line).unwrap();
        let res = cmd.execute(&mut Vec::new(), &mut session);

        assert_eq!(res.unwrap(), Outcome::Continue);
        assert_eq!(*calls.borrow(), vec![os_args(&["echo", "hi", "there"])]);
    }

    #[test]
    #[cfg(unix)]
    fn test_factory_passes_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;
        let (mut session, calls) = session_with(|| Ok(0));
        let line = CommandLine::parse(b"cat caf\xe9.txt").unwrap().unwrap();
        let cmd = Factory::<ExternalCommand>::default().try_create(&line).unwrap();
        cmd.execute(&mut Vec::new(), &mut session).unwrap();

        assert_eq!(calls.borrow()[0][1].as_bytes(), b"caf\xe9.txt");
    }

    #[test]
    fn test_nonzero_exit_still_continues() {
        let (mut session, _) = session_with(|| Ok(3));
        let cmd = ExternalCommand::new(os_args(&["false"]));
        assert_eq!(
            Box::new(cmd).execute(&mut Vec::new(), &mut session).unwrap(),
            Outcome::Continue
        );
    }

    #[test]
    fn test_launch_failure_names_the_program() {
        let (mut session, _) = session_with(|| Err(io::Error::from(io::ErrorKind::NotFound)));
        let cmd = ExternalCommand::new(os_args(&["nosuchprog"]));
        let err = Box::new(cmd)
            .execute(&mut Vec::new(), &mut session)
            .unwrap_err();

        assert!(matches!(err, ShellError::Spawn { ref program, .. } if program == "nosuchprog"));
        assert!(err.to_string().starts_with("nosuchprog: "));
    }

    #[test]
    #[cfg(unix)]
    fn system_launcher_reports_exit_codes() {
        let mut launcher = SystemLauncher;
        assert_eq!(launcher.launch(&os_args(&["true"])).unwrap(), 0);
        assert_eq!(launcher.launch(&os_args(&["false"])).unwrap(), 1);
        assert_eq!(launcher.launch(&os_args(&["sh", "-c", "exit 7"])).unwrap(), 7);
    }

    #[test]
    #[cfg(unix)]
    fn system_launcher_maps_signals() {
        let mut launcher = SystemLauncher;
        let argv = os_args(&["sh", "-c", "kill -9 $$"]);
        assert_eq!(launcher.launch(&argv).unwrap(), 128 + 9);
    }

    #[test]
    fn system_launcher_missing_program_fails() {
        let mut launcher = SystemLauncher;
        let argv = vec![OsString::from(format!("no-such-program-{}", std::process::id()))];
        let err = launcher.launch(&argv).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn system_launcher_rejects_empty_argv() {
        let mut launcher = SystemLauncher;
        let err = launcher.launch(&[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
