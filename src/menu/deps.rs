use anyhow::Result;
use std::fmt;

use super::{python, submenu, Flow, Session};
use crate::install::{self, InstallPlan};
use crate::output;
use crate::project::{PYPROJECT_TOML, REQUIREMENTS_TXT};
use crate::prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Check,
    Pipreqs,
    Back,
}

const ENTRIES: &[Entry] = &[Entry::Check, Entry::Pipreqs, Entry::Back];

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entry::Check => "Check dependency files (requirements.txt / pyproject.toml)",
            Entry::Pipreqs => "Generate requirements.txt (pipreqs)",
            Entry::Back => "Back",
        };
        f.write_str(label)
    }
}

pub fn run(session: &mut Session) -> Result<()> {
    submenu(session, "Python dependency tools", ENTRIES, Entry::Back, |s, entry| match entry {
        Entry::Check => check(s),
        Entry::Pipreqs => pipreqs(s),
        Entry::Back => Ok(Flow::Continue),
    })
}

fn check(session: &mut Session) -> Result<Flow> {
    output::header("Dependency files");
    for manifest in [REQUIREMENTS_TXT, PYPROJECT_TOML] {
        let state = if session.project.has_file(manifest) {
            "found"
        } else {
            "missing"
        };
        output::kv(manifest, state);
    }

    let plan = InstallPlan::for_root(&session.project.root);
    output::kv("Install plan", plan.describe());
    if plan == InstallPlan::NoManifest {
        return Ok(Flow::Pause);
    }

    if prompt::confirm("Install into an environment now?", false)?.ok() != Some(true) {
        return Ok(Flow::Pause);
    }
    let env = session.prompt_existing_env("Environment to install dependencies into")?;
    python::install_into(session, &env)
}

fn pipreqs(session: &mut Session) -> Result<Flow> {
    let env = session.prompt_existing_env("Environment to run pipreqs in")?;
    if session.project.has_file(REQUIREMENTS_TXT)
        && !prompt::confirm_destructive("requirements.txt exists and will be overwritten. Continue?")?
    {
        output::info("requirements.txt left unchanged.");
        return Ok(Flow::Pause);
    }

    install::generate_requirements(session.runner(), &session.project.root, &env)?;
    output::success("requirements.txt generated");
    Ok(Flow::Pause)
}
