//! Tool defaults persisted in an INI file in the home directory.
//!
//! Values are read through with hardcoded fallbacks: a missing file, a
//! missing key, or an unreadable file all yield the defaults.

use anyhow::{Context, Result};
use ini::Ini;
use std::path::{Path, PathBuf};

use crate::output;
use crate::paths;

pub const SECTION: &str = "Defaults";
pub const PYTHON_VERSION_KEY: &str = "PythonVersion";
pub const GIT_PROXY_KEY: &str = "GitProxy";

pub const DEFAULT_PYTHON_VERSION: &str = "3.10";
pub const DEFAULT_GIT_PROXY: &str = "socks5://127.0.0.1:10090";

#[derive(Debug, Clone)]
pub struct ToolConfig {
    path: PathBuf,
    ini: Ini,
}

impl ToolConfig {
    /// Load from the default location in the home directory
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(&paths::config_path()?))
    }

    /// Load from a given path; unreadable files fall back to defaults
    pub fn load_from(path: &Path) -> Self {
        let ini = if path.is_file() {
            match Ini::load_from_file(path) {
                Ok(ini) => ini,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                    output::warning(&format!(
                        "Could not read {} ({}), using defaults",
                        path.display(),
                        e
                    ));
                    Ini::new()
                }
            }
        } else {
            Ini::new()
        };

        Self {
            path: path.to_path_buf(),
            ini,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn python_version(&self) -> String {
        self.get(PYTHON_VERSION_KEY)
            .unwrap_or(DEFAULT_PYTHON_VERSION)
            .to_string()
    }

    pub fn git_proxy(&self) -> String {
        self.get(GIT_PROXY_KEY).unwrap_or(DEFAULT_GIT_PROXY).to_string()
    }

    pub fn set_python_version(&mut self, version: &str) -> Result<()> {
        self.set(PYTHON_VERSION_KEY, version)
    }

    pub fn set_git_proxy(&mut self, proxy: &str) -> Result<()> {
        self.set(GIT_PROXY_KEY, proxy)
    }

    /// Keys compare case-insensitively (other writers lowercase them)
    fn get(&self, key: &str) -> Option<&str> {
        let section = self
            .ini
            .iter()
            .find(|(name, _)| name.is_some_and(|n| n.eq_ignore_ascii_case(SECTION)))
            .map(|(_, props)| props)?;

        section
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Set a value and write the file
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let section_name = self
            .ini
            .sections()
            .flatten()
            .find(|n| n.eq_ignore_ascii_case(SECTION))
            .unwrap_or(SECTION)
            .to_string();

        if let Some(props) = self.ini.section_mut(Some(section_name.as_str())) {
            let stale: Vec<String> = props
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(key) && *k != key)
                .map(|(k, _)| k.to_string())
                .collect();
            for k in stale {
                props.remove(k.as_str());
            }
        }

        self.ini.with_section(Some(section_name)).set(key, value);
        self.save()
    }

    fn save(&self) -> Result<()> {
        self.ini
            .write_to_file(&self.path)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ToolConfig::load_from(&dir.path().join("absent.ini"));
        assert_eq!(config.python_version(), DEFAULT_PYTHON_VERSION);
        assert_eq!(config.git_proxy(), DEFAULT_GIT_PROXY);
    }

    #[test]
    fn test_reads_lowercased_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(
            &path,
            "[Defaults]\npythonversion = 3.12\ngitproxy = http://127.0.0.1:8080\n",
        )
        .unwrap();

        let config = ToolConfig::load_from(&path);
        assert_eq!(config.python_version(), "3.12");
        assert_eq!(config.git_proxy(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_set_persists_and_replaces_old_casing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[Defaults]\npythonversion = 3.9\n").unwrap();

        let mut config = ToolConfig::load_from(&path);
        config.set_python_version("3.11").unwrap();

        let reloaded = ToolConfig::load_from(&path);
        assert_eq!(reloaded.python_version(), "3.11");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("PythonVersion=3.11"));
        assert!(!contents.contains("pythonversion"));
    }

    #[test]
    fn test_set_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.ini");

        let mut config = ToolConfig::load_from(&path);
        config.set_git_proxy("socks5://10.0.0.1:1080").unwrap();

        assert!(path.is_file());
        let reloaded = ToolConfig::load_from(&path);
        assert_eq!(reloaded.git_proxy(), "socks5://10.0.0.1:1080");
        assert_eq!(reloaded.python_version(), DEFAULT_PYTHON_VERSION);
    }
}
