mod detect;
pub mod package_json;

pub use detect::{detect, ProjectKind};

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths;

/// Python manifests, in install priority order
pub const REQUIREMENTS_TXT: &str = "requirements.txt";
pub const PYPROJECT_TOML: &str = "pyproject.toml";

pub const PACKAGE_JSON: &str = "package.json";
pub const NODE_LOCKFILES: &[&str] = &["pnpm-lock.yaml", "package-lock.json", "yarn.lock"];

/// The project this session works on. Detected once at startup.
#[derive(Debug, Clone)]
pub struct Project {
    /// Absolute project root
    pub root: PathBuf,

    pub kind: ProjectKind,
}

impl Project {
    /// Use the current working directory as the project root
    pub fn detect() -> Result<Self> {
        let cwd = env::current_dir().context("Failed to get current directory")?;
        Self::detect_from(&cwd)
    }

    /// Detect from a given directory
    pub fn detect_from(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Project directory {} is not accessible", root.display()))?;
        if !root.is_dir() {
            anyhow::bail!("{} is not a directory", root.display());
        }

        let kind = detect(&root);
        Ok(Self { root, kind })
    }

    /// Directory name, for display
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Suggested environment name derived from the directory name
    pub fn default_env_name(&self) -> String {
        paths::default_env_name(&self.root)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectKind::Python => "python",
            ProjectKind::Node => "node",
            ProjectKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}
