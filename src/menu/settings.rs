use anyhow::Result;

use super::{perform_and_pause, Flow, Session};
use crate::output;
use crate::prompt;

pub fn run(session: &mut Session) -> Result<()> {
    output::clear();
    output::header("Tool defaults");
    perform_and_pause(session, edit_defaults);
    Ok(())
}

fn edit_defaults(session: &mut Session) -> Result<Flow> {
    output::kv("Settings file", &session.config.path().display().to_string());

    let current_python = session.config.python_version();
    let current_proxy = session.config.git_proxy();
    output::kv("Python version", &current_python);
    output::kv("Git proxy", &current_proxy);

    let python = prompt::text("Default Python version", Some(current_python.as_str()))?.required()?;
    let proxy = prompt::text("Default Git proxy", Some(current_proxy.as_str()))?.required()?;

    let mut changed = false;
    if python != current_python {
        session.config.set_python_version(&python)?;
        output::success(&format!("Default Python version set to {}", python));
        changed = true;
    }
    if proxy != current_proxy {
        session.config.set_git_proxy(&proxy)?;
        output::success(&format!("Default Git proxy set to {}", proxy));
        changed = true;
    }
    if !changed {
        output::info("No changes.");
    }
    Ok(Flow::Pause)
}
