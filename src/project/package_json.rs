use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Map;
use std::fs;
use std::path::Path;

use super::PACKAGE_JSON;

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    scripts: Map<String, serde_json::Value>,
}

/// Script names from `package.json`, in file order.
/// A missing file yields an empty list.
pub fn script_names(root: &Path) -> Result<Vec<String>> {
    let path = root.join(PACKAGE_JSON);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let package: PackageJson = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(package.scripts.keys().cloned().collect())
}

/// Preferred script: `dev`, then `start`, then whatever comes first
pub fn default_script_index(scripts: &[String]) -> Option<usize> {
    if scripts.is_empty() {
        return None;
    }
    ["dev", "start"]
        .iter()
        .find_map(|wanted| scripts.iter().position(|s| s == wanted))
        .or(Some(0))
}

/// Scripts a launcher may run directly, `dev` before `start`
pub fn launcher_modes(scripts: &[String]) -> Vec<String> {
    ["dev", "start"]
        .iter()
        .filter(|mode| scripts.iter().any(|s| s == *mode))
        .map(|mode| mode.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_script_names_keep_file_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "web", "scripts": {"lint": "eslint .", "build": "vite build", "dev": "vite"}}"#,
        )
        .unwrap();
        assert_eq!(script_names(dir.path()).unwrap(), names(&["lint", "build", "dev"]));
    }

    #[test]
    fn test_script_names_missing_or_without_scripts() {
        let dir = tempdir().unwrap();
        assert!(script_names(dir.path()).unwrap().is_empty());

        fs::write(dir.path().join("package.json"), r#"{"name": "web"}"#).unwrap();
        assert!(script_names(dir.path()).unwrap().is_empty());

        fs::write(dir.path().join("package.json"), "{ broken").unwrap();
        assert!(script_names(dir.path()).is_err());
    }

    #[test]
    fn test_default_script_index() {
        assert_eq!(default_script_index(&names(&["build", "start", "dev"])), Some(2));
        assert_eq!(default_script_index(&names(&["build", "start"])), Some(1));
        assert_eq!(default_script_index(&names(&["build", "lint"])), Some(0));
        assert_eq!(default_script_index(&[]), None);
    }

    #[test]
    fn test_launcher_modes() {
        assert_eq!(launcher_modes(&names(&["start", "dev"])), names(&["dev", "start"]));
        assert_eq!(launcher_modes(&names(&["build"])), Vec::<String>::new());
    }
}
