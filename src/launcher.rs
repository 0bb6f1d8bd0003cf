//! Launcher scripts that activate a Conda environment and run one command.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Files probed, in order, when guessing a Python entry point
pub const PYTHON_ENTRY_CANDIDATES: &[&str] = &["main.py", "app.py", "run.py", "server.py"];

/// Script dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Windows `.bat`
    Batch,
    /// bash `.sh`
    Posix,
}

impl Flavor {
    pub fn native() -> Self {
        if cfg!(windows) {
            Flavor::Batch
        } else {
            Flavor::Posix
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Flavor::Batch => "bat",
            Flavor::Posix => "sh",
        }
    }
}

/// What a launcher runs once the environment is active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    stem: &'static str,
    env: String,
    /// Shown in the script's progress echo, e.g. "Python script: main.py"
    label: String,
    command: String,
}

impl Launcher {
    /// `run.*` that executes `python <entry>`
    pub fn python(env: &str, entry: &str) -> Self {
        Self {
            stem: "run",
            env: env.to_string(),
            label: format!("Python script: {}", entry),
            command: format!("python {}", entry),
        }
    }

    /// `run_node.*` that executes `pnpm run <script>`
    pub fn node(env: &str, script: &str) -> Self {
        let command = format!("pnpm run {}", script);
        Self {
            stem: "run_node",
            env: env.to_string(),
            label: format!("Node.js command: {}", command),
            command,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn file_name(&self, flavor: Flavor) -> String {
        format!("{}.{}", self.stem, flavor.extension())
    }

    /// Script text with `\n` line endings. `conda_init` is the shell hook
    /// sourced by POSIX scripts; without one the script refuses to run.
    pub fn render(&self, flavor: Flavor, conda_init: Option<&Path>) -> String {
        match flavor {
            Flavor::Batch => self.render_batch(),
            Flavor::Posix => self.render_posix(conda_init),
        }
    }

    fn render_batch(&self) -> String {
        let env = &self.env;
        format!(
            "@echo off\n\
             echo Activating Conda environment: {env}...\n\
             call conda activate {env}\n\
             \n\
             if %errorlevel% neq 0 (\n\
             \x20   echo Failed to activate Conda environment '{env}'.\n\
             \x20   pause\n\
             \x20   exit /b %errorlevel%\n\
             )\n\
             \n\
             echo Running {label}...\n\
             {command} %*\n\
             \n\
             echo Script finished. Deactivating environment...\n\
             call conda deactivate\n\
             echo Press any key to close...\n\
             pause > nul\n",
            env = env,
            label = self.label,
            command = self.command,
        )
    }

    fn render_posix(&self, conda_init: Option<&Path>) -> String {
        let env = &self.env;
        let source_line = match conda_init {
            Some(path) => format!("source \"{}\"", path.display()),
            None => "echo \"Error: Could not find conda init script.\"\nexit 1".to_string(),
        };
        format!(
            "#!/bin/bash\n\
             SCRIPT_DIR=\"$( cd \"$( dirname \"${{BASH_SOURCE[0]}}\" )\" &> /dev/null && pwd )\"\n\
             cd \"$SCRIPT_DIR\"\n\
             \n\
             echo \"Activating Conda environment: {env}...\"\n\
             {source_line}\n\
             \n\
             conda activate {env}\n\
             if [ $? -ne 0 ]; then echo \"Error: Failed to activate '{env}'.\"; exit 1; fi\n\
             \n\
             echo \"Running {label}...\"\n\
             {command} \"$@\"\n\
             \n\
             echo \"Script finished. Deactivating environment...\"\n\
             conda deactivate\n",
            env = env,
            source_line = source_line,
            label = self.label,
            command = self.command,
        )
    }

    /// Write the script into `root`, replacing any existing file.
    /// Batch files get CRLF endings; POSIX scripts are made executable.
    pub fn write(&self, root: &Path, flavor: Flavor, conda_init: Option<&Path>) -> Result<PathBuf> {
        let path = root.join(self.file_name(flavor));
        let mut text = self.render(flavor, conda_init);
        if flavor == Flavor::Batch {
            text = text.replace('\n', "\r\n");
        }
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;

        #[cfg(unix)]
        if flavor == Flavor::Posix {
            make_executable(&path)?;
        }

        tracing::info!(path = %path.display(), "launcher written");
        Ok(path)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

/// First conventional entry script present in `root`
pub fn detect_python_entry(root: &Path) -> Option<&'static str> {
    PYTHON_ENTRY_CANDIDATES
        .iter()
        .copied()
        .find(|name| root.join(name).is_file())
}

/// Conda's shell hook, searched under `CONDA_ROOT`, `CONDA_PREFIX` and the
/// install owning `CONDA_EXE`
pub fn conda_init_script() -> Option<PathBuf> {
    let var = |name| env::var_os(name).map(PathBuf::from);
    conda_bases(var("CONDA_ROOT"), var("CONDA_PREFIX"), var("CONDA_EXE"))
        .iter()
        .find_map(|base| find_conda_init(base))
}

/// Candidate install roots in lookup order. `CONDA_PREFIX` names the active
/// env, which only holds the hook when it is `base`; `CONDA_EXE` lives in
/// `<base>/bin/conda` (or `<base>\Scripts\conda.exe`).
fn conda_bases(root: Option<PathBuf>, prefix: Option<PathBuf>, exe: Option<PathBuf>) -> Vec<PathBuf> {
    let from_exe = exe.and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf));
    [root, prefix, from_exe].into_iter().flatten().collect()
}

/// `etc/profile.d/conda.sh`, falling back to `condabin/conda_hook.sh`
pub fn find_conda_init(base: &Path) -> Option<PathBuf> {
    [
        base.join("etc").join("profile.d").join("conda.sh"),
        base.join("condabin").join("conda_hook.sh"),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}
