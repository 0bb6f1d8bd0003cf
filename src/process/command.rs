use std::path::{Path, PathBuf};
use std::process::Command;

/// Builder for a single external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    capture: bool,
    check: bool,
    verbose: bool,
}

impl Invocation {
    /// New invocation: captured output, unchecked, echoed
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            capture: true,
            check: false,
            verbose: true,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments in order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run with this working directory
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Connect stdout/stderr to the terminal instead of buffering them
    pub fn streamed(mut self) -> Self {
        self.capture = false;
        self
    }

    /// Escalate a non-zero exit to `CommandFailed`
    pub fn checked(mut self) -> Self {
        self.check = true;
        self
    }

    /// Don't echo the argv or captured stdout
    pub fn quiet(mut self) -> Self {
        self.verbose = false;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    #[cfg(test)]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn captures_output(&self) -> bool {
        self.capture
    }

    pub fn is_checked(&self) -> bool {
        self.check
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Full argv, program first
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Build the std Command (stdio is configured by the runner)
    pub fn build(&self, resolved_program: &Path) -> Command {
        let mut cmd = Command::new(resolved_program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Get the command as a string (for display)
    pub fn as_string(&self) -> String {
        self.argv()
            .iter()
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_defaults() {
        let inv = Invocation::new("conda");
        assert!(inv.captures_output());
        assert!(!inv.is_checked());
        assert!(inv.is_verbose());
        assert!(inv.working_dir().is_none());
    }

    #[test]
    fn test_invocation_builder() {
        let inv = Invocation::new("conda")
            .args(["env", "list"])
            .arg("--json")
            .cwd("/tmp/project")
            .streamed()
            .checked()
            .quiet();

        assert_eq!(inv.argv(), vec!["conda", "env", "list", "--json"]);
        assert_eq!(inv.working_dir(), Some(Path::new("/tmp/project")));
        assert!(!inv.captures_output());
        assert!(inv.is_checked());
        assert!(!inv.is_verbose());
    }

    #[test]
    fn test_as_string_quotes_whitespace() {
        let inv = Invocation::new("git")
            .args(["config", "--global", "http.proxy"])
            .arg("http://proxy host:8080");
        assert_eq!(
            inv.as_string(),
            "git config --global http.proxy \"http://proxy host:8080\""
        );
    }
}
