use anyhow::{Context, Result};
use std::fmt;

use super::{submenu, write_launcher, Flow, Session};
use crate::archive::{self, Packaged};
use crate::conda;
use crate::install;
use crate::interrupt;
use crate::launcher::Launcher;
use crate::output;
use crate::paths;
use crate::process::CommandResult;
use crate::project::{package_json, PACKAGE_JSON};
use crate::prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    CreateAndInstall,
    Install,
    Start,
    Launcher,
    Package,
    Back,
}

const ENTRIES: &[Entry] = &[
    Entry::CreateAndInstall,
    Entry::Install,
    Entry::Start,
    Entry::Launcher,
    Entry::Package,
    Entry::Back,
];

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entry::CreateAndInstall => "Create environment and install dependencies",
            Entry::Install => "Install dependencies",
            Entry::Start => "Start a package.json script",
            Entry::Launcher => "Create launcher script",
            Entry::Package => "Package project (.zip)",
            Entry::Back => "Back",
        };
        f.write_str(label)
    }
}

pub fn run(session: &mut Session) -> Result<()> {
    submenu(session, "Node.js project", ENTRIES, Entry::Back, |s, entry| match entry {
        Entry::CreateAndInstall => create_and_install(s),
        Entry::Install => {
            let env = s.prompt_existing_env("Environment to run pnpm install in")?;
            install_into(s, &env)
        }
        Entry::Start => start_script(s),
        Entry::Launcher => create_launcher(s),
        Entry::Package => package(s),
        Entry::Back => Ok(Flow::Continue),
    })
}

fn create_and_install(session: &mut Session) -> Result<Flow> {
    let default_name = session.project.default_env_name();
    let name = prompt::text("New environment name", Some(default_name.as_str()))?.required()?;
    if session.registry.exists(&name, false) {
        anyhow::bail!("Environment '{}' already exists; install into it instead", name);
    }

    output::status("Creating", &format!("{} (nodejs, pnpm)", name));
    session
        .runner()
        .run(&conda::create_node_env(&name))
        .with_context(|| format!("Creating Node.js environment '{}' failed", name))?;
    session.registry.invalidate();
    let env = session.registry.find_by_name(&name, false).unwrap_or(name);
    output::success(&format!("Environment '{}' created", env));
    session.set_associated(&env);

    if !session.project.has_file(PACKAGE_JSON) {
        output::info("No package.json found, skipping pnpm install.");
        return Ok(Flow::Pause);
    }
    install_into(session, &env)
}

fn install_into(session: &mut Session, env: &str) -> Result<Flow> {
    install::install_node(session.runner(), &session.project.root, env)?;
    output::success("pnpm install finished");
    Ok(Flow::Pause)
}

fn start_script(session: &mut Session) -> Result<Flow> {
    let env = session.prompt_existing_env("Environment to start the service in")?;
    let root = session.project.root.clone();
    let scripts = package_json::script_names(&root)?;
    if scripts.is_empty() {
        anyhow::bail!("package.json defines no scripts");
    }

    let default = package_json::default_script_index(&scripts);
    let index = prompt::select("Script to run", &scripts, default)?.required()?;
    let script = &scripts[index];

    output::info("Press Ctrl+C to stop.");
    output::rule();
    let result = session
        .runner()
        .run(&conda::run_in(&env, "pnpm", ["run", script.as_str()]).cwd(&root).streamed());
    output::rule();

    if interrupt::take() {
        output::info("Service stopped (Ctrl+C).");
        return Ok(Flow::Continue);
    }
    Ok(after_script(script, &result?))
}

/// Keep a failed script's output on screen until the user has read it
fn after_script(script: &str, result: &CommandResult) -> Flow {
    if result.success() {
        return Flow::Continue;
    }
    output::error(&format!(
        "`pnpm run {}` exited with status {}",
        script, result.exit_code
    ));
    Flow::Pause
}

fn create_launcher(session: &mut Session) -> Result<Flow> {
    let env = session.prompt_existing_env("Environment the launcher activates")?;
    let scripts = package_json::script_names(&session.project.root).unwrap_or_else(|e| {
        output::warning(&format!("{:#}", e));
        Vec::new()
    });

    let modes = package_json::launcher_modes(&scripts);
    let script = if modes.is_empty() {
        output::info("No 'dev' or 'start' script in package.json.");
        prompt::text("Script the launcher should run (e.g. build, serve)", None)?.required()?
    } else {
        let index = prompt::select("Script the launcher should run", &modes, Some(0))?.required()?;
        modes[index].clone()
    };
    write_launcher(session, &Launcher::node(&env, &script))
}

fn package(session: &mut Session) -> Result<Flow> {
    let root = session.project.root.clone();
    let name = session.project.name();
    output::status("Packaging", &archive::archive_name(&name));

    let spinner = output::spinner("Compressing project files...");
    let packaged = archive::package(&root, &name);
    spinner.finish_and_clear();

    match packaged? {
        Packaged::Written { path, files } => output::success(&format!(
            "Packaged {} files into {}",
            files,
            paths::display_relative(&path, &root)
        )),
        Packaged::Empty => output::warning("No files qualified; the empty archive was removed"),
    }
    Ok(Flow::Pause)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_script_pauses() {
        let failed = CommandResult {
            exit_code: 1,
            stderr: "ERR_PNPM_NO_SCRIPT".to_string(),
            ..Default::default()
        };
        assert_eq!(after_script("dev", &failed), Flow::Pause);
    }

    #[test]
    fn test_clean_exit_returns_to_menu() {
        assert_eq!(after_script("dev", &CommandResult::default()), Flow::Continue);
    }
}
