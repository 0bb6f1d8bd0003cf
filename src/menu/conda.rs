use anyhow::{Context, Result};
use std::fmt;
use std::fs;

use super::{submenu, Flow, Session};
use crate::conda;
use crate::error::AssistError;
use crate::output;
use crate::paths;
use crate::prompt;
use crate::terminal::{self, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Create,
    Install,
    Terminal,
    Delete,
    Export,
    List,
    Back,
}

const ENTRIES: &[Entry] = &[
    Entry::Create,
    Entry::Install,
    Entry::Terminal,
    Entry::Delete,
    Entry::Export,
    Entry::List,
    Entry::Back,
];

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entry::Create => "Create environment",
            Entry::Install => "Install packages into an environment",
            Entry::Terminal => "Open a terminal in an environment",
            Entry::Delete => "Delete an environment",
            Entry::Export => "Export environment (.yml)",
            Entry::List => "List environments",
            Entry::Back => "Back",
        };
        f.write_str(label)
    }
}

pub fn run(session: &mut Session) -> Result<()> {
    submenu(session, "Conda environments", ENTRIES, Entry::Back, |s, entry| match entry {
        Entry::Create => create(s).map(|_| Flow::Pause),
        Entry::Install => install_packages(s),
        Entry::Terminal => open_terminal(s),
        Entry::Delete => delete(s),
        Entry::Export => export(s),
        Entry::List => list(s),
        Entry::Back => Ok(Flow::Continue),
    })
}

/// Create a Python environment, or adopt an existing one of the same name.
/// Returns the environment's canonical name.
pub(super) fn create_python_env(session: &mut Session) -> Result<String> {
    let default_name = session.project.default_env_name();
    let name = prompt::text("New environment name", Some(default_name.as_str()))?.required()?;

    if let Some(existing) = session.registry.find_by_name(&name, false) {
        output::warning(&format!("Environment '{}' already exists", existing));
        let adopt = prompt::confirm(&format!("Use '{}' instead?", existing), false)?.required()?;
        if !adopt {
            return Err(AssistError::UserCancelled.into());
        }
        return Ok(existing);
    }

    let default_version = session.config.python_version();
    let version = prompt::text("Python version", Some(default_version.as_str()))?.required()?;

    output::status("Creating", &format!("{} (Python {})", name, version));
    session.runner().run(&conda::create_env(&name, &version))?;
    session.registry.invalidate();

    let created = session.registry.find_by_name(&name, false).unwrap_or(name);
    output::success(&format!("Environment '{}' created", created));
    Ok(created)
}

fn create(session: &mut Session) -> Result<String> {
    let env = create_python_env(session)?;
    session.set_associated(&env);
    Ok(env)
}

fn install_packages(session: &mut Session) -> Result<Flow> {
    let env = session.select_env("Target environment")?;
    let packages = prompt::text(
        "Packages to install (space separated, versions and channels allowed)",
        None,
    )?
    .required()?;
    let packages: Vec<&str> = packages.split_whitespace().collect();

    output::status("Installing", &format!("{} into {}", packages.join(" "), env));
    session
        .runner()
        .run(&conda::install_packages(&env, &packages))
        .with_context(|| format!("Installing packages into '{}' failed", env))?;
    output::success(&format!("Packages installed into '{}'", env));
    Ok(Flow::Pause)
}

fn open_terminal(session: &mut Session) -> Result<Flow> {
    let env = session.prompt_existing_env("Environment to open a terminal in")?;
    let platform = Platform::current();
    let emulator = match platform {
        Platform::Linux => terminal::find_linux_terminal(),
        _ => None,
    };

    let Some(invocation) = terminal::open_invocation(platform, &env, emulator) else {
        output::error("No supported terminal emulator was found");
        output::info(&format!("Run manually: {}", terminal::activate_command(&env)));
        return Ok(Flow::Pause);
    };

    match terminal::spawn_detached(&invocation) {
        Ok(()) => {
            output::success(&format!("Opened a terminal with '{}' activated", env));
            Ok(Flow::Continue)
        }
        Err(e) => {
            output::error(&format!("Could not open a terminal: {}", e));
            output::info(&format!("Run manually: {}", terminal::activate_command(&env)));
            Ok(Flow::Pause)
        }
    }
}

fn delete(session: &mut Session) -> Result<Flow> {
    let env = session.select_env("Environment to delete")?;
    if !prompt::confirm_destructive(&format!("Permanently delete '{}'?", env))? {
        output::info("Deletion cancelled.");
        return Ok(Flow::Pause);
    }

    output::status("Deleting", &env);
    let result = session.runner().run(&conda::remove_env(&env));
    session.registry.invalidate();
    result.with_context(|| format!("Deleting '{}' failed", env))?;
    output::success(&format!("Environment '{}' deleted", env));
    Ok(Flow::Pause)
}

fn export(session: &mut Session) -> Result<Flow> {
    let env = session.select_env("Environment to export")?;
    let root = session.project.root.clone();
    let out_dir = root.join(".env");
    let out_file = out_dir.join(format!("{}_environment.yml", env));

    output::status(
        "Exporting",
        &format!("{} to {}", env, paths::display_relative(&out_file, &root)),
    );
    let result = session
        .runner()
        .run(&conda::export_env(&env))
        .with_context(|| format!("Exporting '{}' failed", env))?;

    if result.stdout.trim().is_empty() {
        output::warning("conda reported success but produced no output; nothing written");
        return Ok(Flow::Pause);
    }

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    fs::write(&out_file, &result.stdout)
        .with_context(|| format!("Failed to write {}", out_file.display()))?;

    output::success(&format!(
        "Exported to {}",
        paths::display_relative(&out_file, &root)
    ));
    output::info(&format!(
        "Recreate with: conda env create -f \"{}\"",
        out_file.display()
    ));
    Ok(Flow::Pause)
}

fn list(session: &mut Session) -> Result<Flow> {
    let envs = session.list_envs();
    output::header("Conda environments");
    if envs.is_empty() {
        output::info("No environments found, or the listing failed.");
    }
    for env in &envs {
        let marker = if Some(env.as_str()) == session.associated_env() {
            " (associated)"
        } else {
            ""
        };
        output::list_item(&format!("{}{}", env, marker));
    }
    Ok(Flow::Pause)
}
