//! FastAPI helpers: locating the app object, serving it with uvicorn and
//! opening the generated API docs.

use std::path::Path;

use crate::conda;
use crate::process::Invocation;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "8000";

/// Probe files paired with the uvicorn app path they imply, first hit wins
const APP_CANDIDATES: &[(&[&str], &str)] = &[
    (&["main.py"], "main:app"),
    (&["app", "main.py"], "app.main:app"),
    (&["server.py"], "server:app"),
    (&["app.py"], "app:app"),
];

/// Guess the `module:attribute` uvicorn should serve
pub fn detect_app(root: &Path) -> Option<&'static str> {
    APP_CANDIDATES
        .iter()
        .find(|(parts, _)| parts.iter().fold(root.to_path_buf(), |p, s| p.join(s)).is_file())
        .map(|(_, app)| *app)
}

/// Settings for one dev-server run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub app: String,
    pub host: String,
    pub port: String,
    pub reload: bool,
}

/// `conda run -n <env> --no-capture-output uvicorn <app> --host <h> --port <p> [--reload]`
///
/// Streamed and unchecked: the server runs until the operator stops it.
pub fn serve(env: &str, root: &Path, opts: &ServerOptions) -> Invocation {
    let mut args = vec![
        opts.app.clone(),
        "--host".to_string(),
        opts.host.clone(),
        "--port".to_string(),
        opts.port.clone(),
    ];
    if opts.reload {
        args.push("--reload".to_string());
    }
    conda::run_in(env, "uvicorn", args).cwd(root).streamed()
}

/// Which docs UI to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocsPage {
    Swagger,
    Redoc,
}

impl DocsPage {
    pub const ALL: [DocsPage; 2] = [DocsPage::Swagger, DocsPage::Redoc];

    pub fn path(self) -> &'static str {
        match self {
            DocsPage::Swagger => "/docs",
            DocsPage::Redoc => "/redoc",
        }
    }
}

impl std::fmt::Display for DocsPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocsPage::Swagger => write!(f, "Swagger UI ({})", self.path()),
            DocsPage::Redoc => write!(f, "ReDoc ({})", self.path()),
        }
    }
}

/// Join a base URL and a docs path, tolerating a trailing slash
pub fn docs_url(base: &str, page: DocsPage) -> String {
    format!("{}{}", base.trim().trim_end_matches('/'), page.path())
}

/// Hand the URL to the system browser
pub fn open_docs(url: &str) -> std::io::Result<()> {
    tracing::debug!(url, "opening browser");
    open::that(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_detect_app_priority() {
        let dir = tempdir().unwrap();
        assert_eq!(detect_app(dir.path()), None);

        fs::write(dir.path().join("app.py"), "").unwrap();
        assert_eq!(detect_app(dir.path()), Some("app:app"));

        fs::write(dir.path().join("server.py"), "").unwrap();
        assert_eq!(detect_app(dir.path()), Some("server:app"));

        fs::create_dir(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app").join("main.py"), "").unwrap();
        assert_eq!(detect_app(dir.path()), Some("app.main:app"));

        fs::write(dir.path().join("main.py"), "").unwrap();
        assert_eq!(detect_app(dir.path()), Some("main:app"));
    }

    #[test]
    fn test_serve_argv() {
        let root = Path::new("/srv/api");
        let mut opts = ServerOptions {
            app: "main:app".into(),
            host: "0.0.0.0".into(),
            port: "9000".into(),
            reload: true,
        };
        let inv = serve("api", root, &opts);
        assert_eq!(
            inv.argv(),
            vec![
                "conda", "run", "-n", "api", "--no-capture-output", "uvicorn", "main:app",
                "--host", "0.0.0.0", "--port", "9000", "--reload"
            ]
        );
        assert_eq!(inv.working_dir(), Some(root));
        assert!(!inv.captures_output());
        assert!(!inv.is_checked());

        opts.reload = false;
        assert_eq!(serve("api", root, &opts).argv().last().unwrap(), "9000");
    }

    #[test]
    fn test_docs_url() {
        assert_eq!(docs_url("http://127.0.0.1:8000/", DocsPage::Swagger), "http://127.0.0.1:8000/docs");
        assert_eq!(docs_url("http://localhost:9000", DocsPage::Redoc), "http://localhost:9000/redoc");
    }
}
