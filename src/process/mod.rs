mod command;

pub use command::Invocation;

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use crate::error::ExecError;
use crate::output;

/// What came back from a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// How a finished invocation should be read by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Non-zero exit on an unchecked invocation
    Warning,
    /// Non-zero exit on a checked invocation
    Failure,
}

impl Outcome {
    pub fn classify(invocation: &Invocation, result: &CommandResult) -> Self {
        if result.success() {
            Outcome::Success
        } else if invocation.is_checked() {
            Outcome::Failure
        } else {
            Outcome::Warning
        }
    }
}

/// Executes invocations. `execute` does the raw spawn; `run` layers the
/// echo/check semantics on top and is what callers use.
pub trait Runner {
    /// Spawn and wait. Only fails when the process could not be started.
    fn execute(&self, invocation: &Invocation) -> Result<CommandResult, ExecError>;

    fn run(&self, invocation: &Invocation) -> Result<CommandResult, ExecError> {
        if invocation.is_verbose() {
            output::command(&invocation.as_string());
        }
        tracing::debug!(argv = ?invocation.argv(), cwd = ?invocation.working_dir(), "running");

        let result = self.execute(invocation)?;

        if invocation.is_verbose() && invocation.captures_output() && !result.stdout.is_empty() {
            output::captured(&result.stdout);
        }
        if !result.stderr.is_empty() {
            output::captured_stderr(&result.stderr);
        }

        match Outcome::classify(invocation, &result) {
            Outcome::Success => Ok(result),
            Outcome::Warning => {
                output::warning(&format!(
                    "`{}` returned exit code {}",
                    invocation.program(),
                    result.exit_code
                ));
                Ok(result)
            }
            Outcome::Failure => {
                tracing::debug!(exit_code = result.exit_code, "checked invocation failed");
                Err(ExecError::CommandFailed {
                    command: invocation.as_string(),
                    exit_code: result.exit_code,
                    stderr: result.stderr,
                })
            }
        }
    }
}

/// Runs invocations as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Locate the program on PATH (or accept an explicit path)
    fn resolve(program: &str) -> Result<PathBuf, ExecError> {
        which::which(program).map_err(|_| ExecError::ExecutableNotFound {
            program: program.to_string(),
        })
    }
}

impl Runner for SystemRunner {
    fn execute(&self, invocation: &Invocation) -> Result<CommandResult, ExecError> {
        let resolved = Self::resolve(invocation.program())?;
        let mut cmd = invocation.build(&resolved);
        let spawn_error = |source: io::Error| {
            if source.kind() == io::ErrorKind::NotFound {
                ExecError::ExecutableNotFound {
                    program: invocation.program().to_string(),
                }
            } else {
                ExecError::Io {
                    command: invocation.as_string(),
                    source,
                }
            }
        };

        if invocation.captures_output() {
            cmd.stdin(Stdio::null());
            let out = cmd.output().map_err(spawn_error)?;
            Ok(CommandResult {
                exit_code: exit_code(out.status),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            })
        } else {
            cmd.stdin(Stdio::inherit());
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
            let status = cmd.status().map_err(spawn_error)?;
            Ok(CommandResult {
                exit_code: exit_code(status),
                ..Default::default()
            })
        }
    }
}

/// Exit code, with signal deaths mapped to 128 + signal like a shell does
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Recording runner for tests: replays scripted responses, keeps every argv
#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    pub enum Scripted {
        Exit(i32, &'static str),
        Missing,
    }

    #[derive(Default)]
    pub struct RecordingRunner {
        responses: RefCell<VecDeque<Scripted>>,
        calls: RefCell<Vec<Invocation>>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response; once the queue is empty every call exits 0
        pub fn respond(self, response: Scripted) -> Self {
            self.responses.borrow_mut().push_back(response);
            self
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }

        pub fn argvs(&self) -> Vec<Vec<String>> {
            self.calls.borrow().iter().map(Invocation::argv).collect()
        }
    }

    impl Runner for RecordingRunner {
        fn execute(&self, invocation: &Invocation) -> Result<CommandResult, ExecError> {
            self.calls.borrow_mut().push(invocation.clone());
            match self.responses.borrow_mut().pop_front() {
                Some(Scripted::Exit(exit_code, stdout)) => Ok(CommandResult {
                    exit_code,
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                }),
                Some(Scripted::Missing) => Err(ExecError::ExecutableNotFound {
                    program: invocation.program().to_string(),
                }),
                None => Ok(CommandResult::default()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingRunner, Scripted};
    use super::*;

    #[test]
    fn test_classify() {
        let failed = CommandResult {
            exit_code: 2,
            ..Default::default()
        };
        let ok = CommandResult::default();
        let unchecked = Invocation::new("git");
        let checked = Invocation::new("git").checked();

        assert_eq!(Outcome::classify(&checked, &ok), Outcome::Success);
        assert_eq!(Outcome::classify(&unchecked, &failed), Outcome::Warning);
        assert_eq!(Outcome::classify(&checked, &failed), Outcome::Failure);
    }

    #[test]
    fn test_run_checked_escalates() {
        let runner = RecordingRunner::new().respond(Scripted::Exit(4, ""));
        let err = runner
            .run(&Invocation::new("pip").arg("install").checked().quiet())
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(4));
    }

    #[test]
    fn test_run_unchecked_tolerates() {
        let runner = RecordingRunner::new().respond(Scripted::Exit(4, ""));
        let result = runner
            .run(&Invocation::new("pip").arg("install").quiet())
            .unwrap();
        assert_eq!(result.exit_code, 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_checked_failure_keeps_exit_code() {
        let inv = Invocation::new("sh").args(["-c", "exit 3"]).checked().quiet();
        match SystemRunner.run(&inv) {
            Err(ExecError::CommandFailed { exit_code, .. }) => assert_eq!(exit_code, 3),
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_unchecked_failure_returns() {
        let inv = Invocation::new("sh").args(["-c", "exit 3"]).quiet();
        let result = SystemRunner.run(&inv).unwrap();
        assert_eq!(result.exit_code, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output() {
        let inv = Invocation::new("sh")
            .args(["-c", "echo out; echo err >&2"])
            .quiet();
        let result = SystemRunner.run(&inv).unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_respects_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("pwd").cwd(dir.path()).quiet();
        let result = SystemRunner.run(&inv).unwrap();
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_system_runner_missing_executable() {
        let inv = Invocation::new("env-assist-no-such-program-xyz").quiet();
        match SystemRunner.run(&inv) {
            Err(ExecError::ExecutableNotFound { program }) => {
                assert_eq!(program, "env-assist-no-such-program-xyz")
            }
            other => panic!("expected ExecutableNotFound, got {:?}", other),
        }
    }
}
