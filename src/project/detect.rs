use std::fs;
use std::path::Path;

use super::{NODE_LOCKFILES, PACKAGE_JSON, PYPROJECT_TOML, REQUIREMENTS_TXT};

/// Closed set of project types the menus know how to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Python,
    Node,
    Unknown,
}

/// Classify a project root by its marker files.
///
/// First match wins:
/// 1. `pyproject.toml` or `requirements.txt` (beats Node markers)
/// 2. `package.json` or a Node lockfile
/// 3. any `.py` file in the root, `src/`, or a directory named like the root
pub fn detect(root: &Path) -> ProjectKind {
    if [PYPROJECT_TOML, REQUIREMENTS_TXT]
        .iter()
        .any(|marker| root.join(marker).exists())
    {
        return ProjectKind::Python;
    }

    if std::iter::once(&PACKAGE_JSON)
        .chain(NODE_LOCKFILES)
        .any(|marker| root.join(marker).exists())
    {
        return ProjectKind::Node;
    }

    let mut source_dirs = vec![root.to_path_buf(), root.join("src")];
    if let Some(name) = root.file_name() {
        source_dirs.push(root.join(name));
    }
    if source_dirs.iter().any(|dir| contains_python_file(dir)) {
        return ProjectKind::Python;
    }

    ProjectKind::Unknown
}

/// Non-recursive check for `*.py` files
fn contains_python_file(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        let path = entry.path();
        path.is_file() && path.extension().is_some_and(|ext| ext == "py")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_requirements_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Python);
    }

    #[test]
    fn test_python_manifest_beats_node() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "").unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Python);
    }

    #[test]
    fn test_package_json_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Node);
    }

    #[test]
    fn test_lockfile_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pnpm-lock.yaml"), "lockfileVersion: 9\n").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Node);
    }

    #[test]
    fn test_node_markers_beat_stray_python() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::write(dir.path().join("build.py"), "").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Node);
    }

    #[test]
    fn test_empty_root() {
        let dir = tempdir().unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Unknown);
    }

    #[test]
    fn test_stray_py_in_root() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("script.py"), "print('hi')\n").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Python);
    }

    #[test]
    fn test_py_in_src_or_package_dir() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("app.py"), "").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Python);

        let dir = tempdir().unwrap();
        let root = dir.path().join("tool");
        let package = root.join("tool");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("__init__.py"), "").unwrap();
        assert_eq!(detect(&root), ProjectKind::Python);
    }

    #[test]
    fn test_nested_py_elsewhere_ignored() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("scripts");
        fs::create_dir(&deep).unwrap();
        fs::write(deep.join("helper.py"), "").unwrap();
        assert_eq!(detect(dir.path()), ProjectKind::Unknown);
    }
}
