use anyhow::{Context, Result};
use std::fmt;

use super::{submenu, Flow, Session};
use crate::git;
use crate::output;
use crate::prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    SetProxy,
    UnsetProxy,
    Back,
}

const ENTRIES: &[Entry] = &[Entry::SetProxy, Entry::UnsetProxy, Entry::Back];

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Entry::SetProxy => "Set global Git proxy",
            Entry::UnsetProxy => "Unset global Git proxy",
            Entry::Back => "Back",
        };
        f.write_str(label)
    }
}

pub fn run(session: &mut Session) -> Result<()> {
    submenu(session, "Git tools", ENTRIES, Entry::Back, |s, entry| match entry {
        Entry::SetProxy => set_proxy(s),
        Entry::UnsetProxy => unset_proxy(s),
        Entry::Back => Ok(Flow::Continue),
    })
}

fn set_proxy(session: &mut Session) -> Result<Flow> {
    let default_proxy = session.config.git_proxy();
    let url = prompt::text(
        "Git proxy (e.g. http://127.0.0.1:8080 or socks5://127.0.0.1:1080)",
        Some(default_proxy.as_str()),
    )?
    .required()?;

    output::status("Setting", &format!("global Git proxy to {}", url));
    git::set_proxy(session.runner(), &url)
        .context("Setting the Git proxy failed; check that git is installed and the URL is valid")?;
    output::success("Global Git proxy set");
    Ok(Flow::Pause)
}

fn unset_proxy(session: &mut Session) -> Result<Flow> {
    output::status("Unsetting", "global Git proxy");
    let report = git::unset_proxy(session.runner());
    for (key, reason) in &report.failed {
        output::error(&format!("Could not unset {}: {}", key, reason));
    }
    if report.cleared.is_empty() {
        output::warning("The Git proxy could not be removed");
    } else {
        output::success("Global Git proxy removed (if it was set)");
    }
    Ok(Flow::Pause)
}
