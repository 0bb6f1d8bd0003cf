//! Zip packaging of a Node project, leaving out dependencies, VCS data,
//! build output and local secrets.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Any path component with one of these names is skipped
pub const EXCLUDED_NAMES: &[&str] = &[
    "node_modules",
    ".git",
    ".vscode",
    "dist",
    "build",
    ".DS_Store",
    "Thumbs.db",
];
pub const EXCLUDED_SUFFIXES: &[&str] = &[".log", ".env", ".zip", ".tgz"];
pub const EXCLUDED_PREFIXES: &[&str] = &[".env."];

/// Name of the archive for a project directory
pub fn archive_name(project_name: &str) -> String {
    format!("{}_package.zip", project_name)
}

/// Whether a path relative to the project root stays out of the archive
pub fn is_excluded(rel_path: &Path) -> bool {
    let in_excluded_dir = rel_path
        .components()
        .any(|c| EXCLUDED_NAMES.iter().any(|name| c.as_os_str() == *name));
    if in_excluded_dir {
        return true;
    }
    let Some(file_name) = rel_path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    EXCLUDED_SUFFIXES.iter().any(|s| file_name.ends_with(s))
        || EXCLUDED_PREFIXES.iter().any(|p| file_name.starts_with(p))
}

/// Outcome of a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packaged {
    Written { path: PathBuf, files: usize },
    /// Nothing qualified; the empty archive was removed
    Empty,
}

/// Write `<name>_package.zip` into `root`. On any failure the partial
/// archive is removed.
pub fn package(root: &Path, project_name: &str) -> Result<Packaged> {
    let archive_path = root.join(archive_name(project_name));
    let result = write_archive(root, &archive_path);
    match result {
        Ok(0) => {
            remove_quietly(&archive_path);
            Ok(Packaged::Empty)
        }
        Ok(files) => Ok(Packaged::Written {
            path: archive_path,
            files,
        }),
        Err(e) => {
            remove_quietly(&archive_path);
            Err(e)
        }
    }
}

fn write_archive(root: &Path, archive_path: &Path) -> Result<usize> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut added = 0;
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            rel.as_os_str().is_empty() || !is_excluded(rel)
        })
    {
        let entry = entry.context("Failed to walk project directory")?;
        if !entry.file_type().is_file() || entry.path() == archive_path {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .context("Failed to compute relative path")?;

        // zip entries always use forward slashes
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {}", name))?;
        let mut source = File::open(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        io::copy(&mut source, &mut zip).with_context(|| format!("Failed to compress {}", name))?;
        added += 1;
    }

    zip.finish().context("Failed to finalize archive")?;
    tracing::debug!(files = added, archive = %archive_path.display(), "archive written");
    Ok(added)
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "could not remove archive");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_is_excluded() {
        assert!(is_excluded(Path::new("node_modules/react/index.js")));
        assert!(is_excluded(Path::new("src/.git/HEAD")));
        assert!(is_excluded(Path::new("debug.log")));
        assert!(is_excluded(Path::new(".env")));
        assert!(is_excluded(Path::new(".env.local")));
        assert!(is_excluded(Path::new("pkg/web-1.0.0.tgz")));
        assert!(is_excluded(Path::new("assets/.DS_Store")));
        assert!(!is_excluded(Path::new("src/index.js")));
        assert!(!is_excluded(Path::new("builder/main.js")));
        assert!(!is_excluded(Path::new(".envrc")));
    }

    #[test]
    fn test_package_skips_excluded_content() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(root.join("src/components/App.jsx"), "export default 1").unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("node_modules/lib/index.js"), "").unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/bundle.js"), "").unwrap();
        fs::write(root.join(".env.production"), "SECRET=1").unwrap();
        fs::write(root.join("npm-debug.log"), "").unwrap();

        let packaged = package(root, "web").unwrap();

        let Packaged::Written { path, files } = packaged else {
            panic!("expected an archive");
        };
        assert_eq!(path, root.join("web_package.zip"));
        assert_eq!(files, 2);
        assert_eq!(entry_names(&path), vec!["package.json", "src/components/App.jsx"]);
    }

    #[test]
    fn test_repackaging_ignores_previous_archive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.js"), "").unwrap();

        package(dir.path(), "web").unwrap();
        let Packaged::Written { path, files } = package(dir.path(), "web").unwrap() else {
            panic!("expected an archive");
        };
        assert_eq!(files, 1);
        assert_eq!(entry_names(&path), vec!["index.js"]);
    }

    #[test]
    fn test_empty_archive_is_removed() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/x.js"), "").unwrap();

        assert_eq!(package(dir.path(), "web").unwrap(), Packaged::Empty);
        assert!(!dir.path().join("web_package.zip").exists());
    }
}
