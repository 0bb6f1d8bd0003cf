mod archive;
mod conda;
mod config;
mod error;
mod fastapi;
mod git;
mod install;
mod interrupt;
mod launcher;
mod menu;
mod output;
mod paths;
mod process;
mod project;
mod prompt;
mod scaffold;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ToolConfig;
use crate::menu::Session;
use crate::process::SystemRunner;
use crate::project::Project;

/// Variable holding the log filter, e.g. `ENV_ASSIST_LOG=debug`
const LOG_ENV: &str = "ENV_ASSIST_LOG";

#[derive(Parser)]
#[command(name = "env-assist")]
#[command(about = "Manage per-project Conda environments, dependencies, launchers and dev servers")]
#[command(version)]
struct Cli {
    /// Project directory (defaults to the current directory)
    project_dir: Option<PathBuf>,
}

/// Diagnostics go to stderr; quiet unless asked for
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    interrupt::install().context("Failed to install the Ctrl-C handler")?;

    let project = match cli.project_dir {
        Some(dir) => Project::detect_from(&dir)?,
        None => Project::detect()?,
    };
    tracing::info!(root = %project.root.display(), kind = %project.kind, "project detected");
    output::status("Project", &project.root.display().to_string());
    output::status("Type", &project.kind.to_string());

    let config = ToolConfig::load()?;
    let runner = SystemRunner;
    let mut session = Session::new(project, config, &runner);

    menu::run(&mut session)
}
