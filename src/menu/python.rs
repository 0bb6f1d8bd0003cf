use anyhow::Result;
use std::fmt;

use super::{conda, submenu, write_launcher, Flow, Session};
use crate::error::ExecError;
use crate::fastapi::{self, DocsPage, ServerOptions};
use crate::install;
use crate::interrupt;
use crate::launcher::{self, Launcher};
use crate::output;
use crate::prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    CreateAndInstall,
    Install,
    Launcher,
    Docs,
    Server,
    Back,
}

const ENTRIES: &[Entry] = &[
    Entry::CreateAndInstall,
    Entry::Install,
    Entry::Launcher,
    Entry::Docs,
    Entry::Server,
    Entry::Back,
];

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entry::CreateAndInstall => "Create environment and install dependencies",
            Entry::Install => "Install dependencies into an environment",
            Entry::Launcher => "Create launcher script",
            Entry::Docs => "Open FastAPI docs",
            Entry::Server => "Run FastAPI dev server",
            Entry::Back => "Back",
        };
        f.write_str(label)
    }
}

pub fn run(session: &mut Session) -> Result<()> {
    submenu(session, "Python project", ENTRIES, Entry::Back, |s, entry| match entry {
        Entry::CreateAndInstall => create_and_install(s),
        Entry::Install => {
            let env = s.prompt_existing_env("Environment to install dependencies into")?;
            install_into(s, &env)
        }
        Entry::Launcher => create_launcher(s),
        Entry::Docs => open_docs(),
        Entry::Server => run_server(s),
        Entry::Back => Ok(Flow::Continue),
    })
}

fn create_and_install(session: &mut Session) -> Result<Flow> {
    let env = conda::create_python_env(session)?;
    session.set_associated(&env);
    install_into(session, &env)
}

pub(super) fn install_into(session: &mut Session, env: &str) -> Result<Flow> {
    output::status("Installing", &format!("dependencies into '{}'", env));
    let plan = install::install_python(session.runner(), &session.project.root, env)?;
    output::success(&format!("Dependencies installed ({})", plan.describe()));
    Ok(Flow::Pause)
}

fn create_launcher(session: &mut Session) -> Result<Flow> {
    let env = session.prompt_existing_env("Environment the launcher activates")?;
    let entry = match launcher::detect_python_entry(&session.project.root) {
        Some(entry) => {
            output::kv("Entry script", entry);
            entry.to_string()
        }
        None => prompt::text("Main Python script to run", Some("main.py"))?.required()?,
    };
    write_launcher(session, &Launcher::python(&env, &entry))
}

fn open_docs() -> Result<Flow> {
    let base = prompt::text("Base URL of the FastAPI app", Some(fastapi::DEFAULT_BASE_URL))?
        .required()?;
    let page = prompt::select("Documentation", &DocsPage::ALL, Some(0))?.required()?;
    let url = fastapi::docs_url(&base, DocsPage::ALL[page]);

    output::status("Opening", &url);
    if let Err(e) = fastapi::open_docs(&url) {
        output::warning(&format!("Could not open a browser: {}", e));
        output::info(&format!("Open it manually: {}", url));
    }
    Ok(Flow::Pause)
}

fn run_server(session: &mut Session) -> Result<Flow> {
    let env = session.prompt_existing_env("Environment to run the server in")?;
    let root = session.project.root.clone();

    let detected = fastapi::detect_app(&root);
    let app = prompt::text("App entry point (module:app)", detected)?.required()?;
    let host = prompt::text("Host", Some(fastapi::DEFAULT_HOST))?.required()?;
    let port = prompt::text("Port", Some(fastapi::DEFAULT_PORT))?.required()?;
    let reload = prompt::confirm("Enable auto-reload?", true)?.required()?;

    let opts = ServerOptions {
        app,
        host,
        port,
        reload,
    };
    output::info("Press Ctrl+C to stop the server.");
    output::rule();
    let result = session.runner().run(&fastapi::serve(&env, &root, &opts));
    output::rule();

    if interrupt::take() {
        output::info("Server stopped (Ctrl+C).");
        return Ok(Flow::Continue);
    }
    match result {
        Ok(result) if result.success() => {
            output::info("Server stopped.");
            Ok(Flow::Continue)
        }
        Ok(_) | Err(ExecError::ExecutableNotFound { .. }) => {
            output::error(&format!(
                "The server did not start. Make sure uvicorn is installed in '{}':",
                env
            ));
            output::command(&format!("conda run -n {} pip install uvicorn", env));
            Ok(Flow::Pause)
        }
        Err(e) => Err(e.into()),
    }
}
