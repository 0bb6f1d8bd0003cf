//! Opening a new terminal window with a Conda environment activated.

use std::process::Stdio;

use crate::error::ExecError;
use crate::process::Invocation;

/// Linux emulators tried in order
pub const LINUX_TERMINALS: &[&str] = &[
    "gnome-terminal",
    "konsole",
    "xfce4-terminal",
    "lxterminal",
    "mate-terminal",
    "xterm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}

/// The command to type by hand when no terminal can be opened
pub fn activate_command(env: &str) -> String {
    format!("conda activate {}", env)
}

/// Invocation that opens a terminal with `env` active. `emulator` is the
/// Linux terminal to use; `None` on Linux means none is installed.
pub fn open_invocation(platform: Platform, env: &str, emulator: Option<&str>) -> Option<Invocation> {
    let activate = activate_command(env);
    match platform {
        Platform::Windows => Some(Invocation::new("cmd").args([
            "/c".to_string(),
            "start".to_string(),
            "cmd".to_string(),
            "/k".to_string(),
            format!("{} && title {} Terminal", activate, env),
        ])),
        Platform::MacOs => {
            let script = format!(
                "tell application \"Terminal\" to do script \"{}\"\ntell application \"Terminal\" to activate",
                activate
            );
            Some(Invocation::new("osascript").args(["-e".to_string(), script]))
        }
        Platform::Linux => {
            let emulator = emulator?;
            let shell = format!(
                "{}; echo \"--- Env '{}' activated. Type 'exit' to close. ---\"; exec $SHELL",
                activate, env
            );
            let inv = match emulator {
                "gnome-terminal" | "mate-terminal" => {
                    Invocation::new(emulator).args(["--".to_string(), "bash".into(), "-c".into(), shell])
                }
                _ => Invocation::new(emulator).args(["-e".to_string(), "bash".into(), "-c".into(), shell]),
            };
            Some(inv)
        }
        Platform::Other => None,
    }
}

/// First installed Linux terminal emulator
pub fn find_linux_terminal() -> Option<&'static str> {
    LINUX_TERMINALS
        .iter()
        .copied()
        .find(|term| which::which(term).is_ok())
}

/// Start the terminal without waiting for it to close
pub fn spawn_detached(invocation: &Invocation) -> Result<(), ExecError> {
    let resolved = which::which(invocation.program()).map_err(|_| ExecError::ExecutableNotFound {
        program: invocation.program().to_string(),
    })?;
    tracing::debug!(argv = ?invocation.argv(), "spawning terminal");
    invocation
        .build(&resolved)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|source| ExecError::Io {
            command: invocation.as_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_invocation() {
        let inv = open_invocation(Platform::Windows, "demo", None).unwrap();
        assert_eq!(
            inv.argv(),
            vec!["cmd", "/c", "start", "cmd", "/k", "conda activate demo && title demo Terminal"]
        );
    }

    #[test]
    fn test_macos_invocation() {
        let inv = open_invocation(Platform::MacOs, "demo", None).unwrap();
        assert_eq!(inv.program(), "osascript");
        assert!(inv.arguments()[1].contains("do script \"conda activate demo\""));
    }

    #[test]
    fn test_linux_invocation_by_emulator() {
        let gnome = open_invocation(Platform::Linux, "demo", Some("gnome-terminal")).unwrap();
        assert_eq!(&gnome.argv()[..4], &["gnome-terminal", "--", "bash", "-c"]);
        assert!(gnome.argv()[4].starts_with("conda activate demo;"));

        let xterm = open_invocation(Platform::Linux, "demo", Some("xterm")).unwrap();
        assert_eq!(&xterm.argv()[..4], &["xterm", "-e", "bash", "-c"]);
    }

    #[test]
    fn test_no_terminal_available() {
        assert!(open_invocation(Platform::Linux, "demo", None).is_none());
        assert!(open_invocation(Platform::Other, "demo", Some("xterm")).is_none());
    }
}
