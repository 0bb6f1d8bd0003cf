//! Built-in project structure templates.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const PROJECT_NAME: &str = "{{project_name}}";

const GITIGNORE: &str = "\
# Python
__pycache__/
*.py[cod]
*$py.class

# Environments
.env
.venv
venv/
env/
ENV/

# IDE / Editor Folders
.vscode/
.idea/

# OS Files
.DS_Store
Thumbs.db

# Build Artifacts
dist/
build/
*.egg-info/
";

const FLASK_APP: &str = r#"from flask import Flask, render_template

app = Flask(__name__)


@app.route("/")
def index():
    return render_template("index.html")


if __name__ == "__main__":
    app.run(debug=True)
"#;

const FLASK_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{{project_name}}</title>
    <link rel="stylesheet" href="{{ url_for('static', filename='style.css') }}">
</head>
<body>
    <h1>{{project_name}}</h1>
</body>
</html>
"#;

const FLASK_STYLE: &str = "body {\n    font-family: sans-serif;\n    margin: 2rem;\n}\n";

/// A named set of files, paths relative to the project root
#[derive(Debug)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    files: &'static [(&'static str, &'static str)],
}

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "github_standard",
        description: "Standard GitHub layout (README, .gitignore)",
        files: &[
            ("README.md", "# {{project_name}}\n\nProject description.\n"),
            (".gitignore", GITIGNORE),
        ],
    },
    Template {
        name: "python_flask",
        description: "Minimal Python Flask web application",
        files: &[
            ("app.py", FLASK_APP),
            ("requirements.txt", "flask\n"),
            ("templates/index.html", FLASK_INDEX),
            ("static/style.css", FLASK_STYLE),
        ],
    },
];

impl Template {
    #[cfg(test)]
    pub fn find(name: &str) -> Option<&'static Template> {
        TEMPLATES.iter().find(|t| t.name == name)
    }

    /// Top-level entries the template creates
    fn top_level(&self) -> BTreeSet<&'static str> {
        self.files
            .iter()
            .filter_map(|(path, _)| path.split('/').next())
            .collect()
    }

    /// Top-level entries that already exist under `root`
    pub fn conflicts(&self, root: &Path) -> Vec<&'static str> {
        self.top_level()
            .into_iter()
            .filter(|name| root.join(name).exists())
            .collect()
    }

    /// Write every file, replacing existing top-level entries wholesale.
    /// Returns the top-level names written.
    pub fn materialize(&self, root: &Path, project_name: &str) -> Result<Vec<&'static str>> {
        let top_level = self.top_level();
        for name in &top_level {
            let target = root.join(name);
            if target.is_dir() {
                fs::remove_dir_all(&target)
                    .with_context(|| format!("Failed to replace {}", target.display()))?;
            }
        }

        for (rel, body) in self.files {
            let target = rel.split('/').fold(root.to_path_buf(), |p, s| p.join(s));
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&target, body.replace(PROJECT_NAME, project_name))
                .with_context(|| format!("Failed to write {}", target.display()))?;
        }

        tracing::info!(template = self.name, root = %root.display(), "template materialized");
        Ok(top_level.into_iter().collect())
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find() {
        assert!(Template::find("github_standard").is_some());
        assert!(Template::find("python_flask").is_some());
        assert!(Template::find("rails").is_none());
    }

    #[test]
    fn test_conflicts_are_top_level() {
        let dir = tempdir().unwrap();
        let flask = Template::find("python_flask").unwrap();
        assert!(flask.conflicts(dir.path()).is_empty());

        fs::create_dir(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("app.py"), "").unwrap();
        assert_eq!(flask.conflicts(dir.path()), vec!["app.py", "templates"]);
    }

    #[test]
    fn test_materialize_flask() {
        let dir = tempdir().unwrap();
        let stale = dir.path().join("templates").join("old.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "").unwrap();

        let written = Template::find("python_flask")
            .unwrap()
            .materialize(dir.path(), "shop")
            .unwrap();

        assert_eq!(written, vec!["app.py", "requirements.txt", "static", "templates"]);
        assert!(!stale.exists());
        let index = fs::read_to_string(dir.path().join("templates/index.html")).unwrap();
        assert!(index.contains("<title>shop</title>"));
        assert!(index.contains("url_for('static'"));
        assert_eq!(fs::read_to_string(dir.path().join("requirements.txt")).unwrap(), "flask\n");
    }

    #[test]
    fn test_materialize_readme_uses_project_name() {
        let dir = tempdir().unwrap();
        Template::find("github_standard")
            .unwrap()
            .materialize(dir.path(), "demo")
            .unwrap();
        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert!(readme.starts_with("# demo\n"));
        assert!(fs::read_to_string(dir.path().join(".gitignore"))
            .unwrap()
            .contains("__pycache__/"));
    }
}
