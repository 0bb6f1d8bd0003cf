use anyhow::Result;

use super::{perform_and_pause, Flow, Session};
use crate::output;
use crate::prompt;
use crate::scaffold::TEMPLATES;

pub fn run(session: &mut Session) -> Result<()> {
    output::clear();
    output::header("Generate project structure");
    perform_and_pause(session, generate);
    Ok(())
}

fn generate(session: &mut Session) -> Result<Flow> {
    let index = prompt::select("Template", TEMPLATES, None)?.required()?;
    let template = &TEMPLATES[index];
    let root = &session.project.root;

    let conflicts = template.conflicts(root);
    if !conflicts.is_empty() {
        output::warning("These entries already exist:");
        for name in &conflicts {
            output::list_item(name);
        }
        if !prompt::confirm_destructive("Continue and overwrite them?")? {
            output::info("Nothing was changed.");
            return Ok(Flow::Pause);
        }
    }

    let written = template.materialize(root, &session.project.name())?;
    for name in &written {
        output::list_item(name);
    }
    output::success(&format!("Template '{}' generated", template.name));
    Ok(Flow::Pause)
}
