//! Interactive menu tree.
//!
//! The main loop owns the session and dispatches to one submenu per
//! concern. Submenu actions return `anyhow::Result<Flow>`; failures and
//! cancellations are printed by [`perform`] and the menu carries on.

mod conda;
mod deps;
mod git;
mod node;
mod python;
mod settings;
mod structure;

use anyhow::Result;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::conda::EnvRegistry;
use crate::config::ToolConfig;
use crate::error::{self, AssistError};
use crate::interrupt;
use crate::launcher::{self, Flavor, Launcher};
use crate::output;
use crate::paths;
use crate::process::Runner;
use crate::project::{Project, ProjectKind};
use crate::prompt::{self, Answer};

/// What happens after an action finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Wait for Enter before redrawing the menu
    Pause,
    /// Redraw right away (hand-offs to servers and terminals)
    Continue,
}

/// State shared by every menu for one run of the tool
pub struct Session<'r> {
    pub project: Project,
    pub config: ToolConfig,
    pub registry: EnvRegistry<'r>,
    runner: &'r dyn Runner,
    /// Existing environment matching the project's default name
    associated_env: Option<String>,
}

impl<'r> Session<'r> {
    pub fn new(project: Project, config: ToolConfig, runner: &'r dyn Runner) -> Self {
        Self {
            project,
            config,
            registry: EnvRegistry::new(runner),
            runner,
            associated_env: None,
        }
    }

    pub fn runner(&self) -> &'r dyn Runner {
        self.runner
    }

    pub fn associated_env(&self) -> Option<&str> {
        self.associated_env.as_deref()
    }

    /// Re-resolve the associated environment against the registry
    pub fn refresh_association(&mut self) {
        let default_name = self.project.default_env_name();
        self.associated_env = self.registry.find_by_name(&default_name, true);
    }

    pub fn set_associated(&mut self, env: &str) {
        self.associated_env = Some(env.to_string());
    }

    /// Suggested environment for prompts
    pub fn env_hint(&self) -> String {
        self.associated_env
            .clone()
            .unwrap_or_else(|| self.project.default_env_name())
    }

    pub fn association_label(&self) -> String {
        match self.associated_env {
            Some(ref env) => format!("associated env: {}", env),
            None => "no associated env".to_string(),
        }
    }

    /// Fresh environment listing with a spinner while conda answers
    pub fn list_envs(&mut self) -> Vec<String> {
        let spinner = output::spinner("Querying Conda environments...");
        let envs = self.registry.list(false);
        spinner.finish_and_clear();
        envs
    }

    /// Ask for an existing environment by name; answers with its canonical casing
    pub fn prompt_existing_env(&mut self, prompt: &str) -> Result<String> {
        let hint = self.env_hint();
        let input = prompt::text(prompt, Some(hint.as_str()))?.required()?;
        match self.registry.find_by_name(&input, false) {
            Some(env) => Ok(env),
            None => anyhow::bail!("Environment '{}' does not exist", input),
        }
    }

    /// Pick an environment from the current listing, preselecting the associated one
    pub fn select_env(&mut self, prompt: &str) -> Result<String> {
        let envs = self.list_envs();
        if envs.is_empty() {
            anyhow::bail!("No Conda environments found");
        }
        let hint = self.env_hint().to_lowercase();
        let default = envs.iter().position(|e| e.to_lowercase() == hint);
        let index = prompt::select(prompt, &envs, default)?.required()?;
        Ok(envs[index].clone())
    }
}

/// Entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainEntry {
    Conda,
    PythonProject,
    PythonDeps,
    NodeProject,
    Git,
    Structure,
    Settings,
    Exit,
}

impl MainEntry {
    /// Project-specific entries only show for the matching project kind
    fn available(kind: ProjectKind) -> Vec<MainEntry> {
        let mut entries = vec![MainEntry::Conda];
        match kind {
            ProjectKind::Python => entries.extend([MainEntry::PythonProject, MainEntry::PythonDeps]),
            ProjectKind::Node => entries.push(MainEntry::NodeProject),
            ProjectKind::Unknown => {}
        }
        entries.extend([
            MainEntry::Git,
            MainEntry::Structure,
            MainEntry::Settings,
            MainEntry::Exit,
        ]);
        entries
    }

    fn may_change_envs(self) -> bool {
        matches!(
            self,
            MainEntry::Conda | MainEntry::PythonProject | MainEntry::NodeProject
        )
    }
}

impl fmt::Display for MainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MainEntry::Conda => "Conda environments",
            MainEntry::PythonProject => "Python project",
            MainEntry::PythonDeps => "Python dependency tools",
            MainEntry::NodeProject => "Node.js project",
            MainEntry::Git => "Git tools",
            MainEntry::Structure => "Generate project structure",
            MainEntry::Settings => "Tool defaults",
            MainEntry::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// Run the main menu until the user exits
pub fn run(session: &mut Session) -> Result<()> {
    session.registry.invalidate();
    session.refresh_association();
    let entries = MainEntry::available(session.project.kind);

    loop {
        output::clear();
        output::header("Main menu");
        output::kv(
            "Project",
            &format!(
                "{} ({}) {}",
                session.project.name(),
                session.project.kind,
                session.association_label()
            ),
        );

        let choice = match prompt::select("Select a function", &entries, None)? {
            Answer::Confirmed(index) => entries[index],
            Answer::Cancelled => MainEntry::Exit,
        };
        if choice == MainEntry::Exit {
            output::clear();
            output::info("Goodbye!");
            return Ok(());
        }

        if choice.may_change_envs() {
            session.registry.invalidate();
        }
        interrupt::reset();

        if guarded(choice, || dispatch(session, choice)).flow() == Flow::Pause {
            output::pause();
        }

        // the conda menu may have deleted the associated env
        if choice == MainEntry::Conda || session.associated_env.is_none() {
            session.refresh_association();
        }
    }
}

fn dispatch(session: &mut Session, entry: MainEntry) -> Result<()> {
    match entry {
        MainEntry::Conda => conda::run(session),
        MainEntry::PythonProject => python::run(session),
        MainEntry::PythonDeps => deps::run(session),
        MainEntry::NodeProject => node::run(session),
        MainEntry::Git => git::run(session),
        MainEntry::Structure => structure::run(session),
        MainEntry::Settings => settings::run(session),
        MainEntry::Exit => Ok(()),
    }
}

/// How an action ended, once its message has been printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handled {
    Completed(Flow),
    /// Failed while a Ctrl-C was pending
    Interrupted,
    Cancelled,
    Failed,
    Panicked,
}

impl Handled {
    fn flow(self) -> Flow {
        match self {
            Handled::Completed(flow) => flow,
            _ => Flow::Pause,
        }
    }
}

/// Run one submenu action, printing whatever went wrong
fn perform<F>(session: &mut Session, action: F) -> Handled
where
    F: FnOnce(&mut Session) -> Result<Flow>,
{
    interrupt::reset();
    match action(session) {
        Ok(flow) => {
            if interrupt::take() {
                output::warning("Interrupted");
            }
            Handled::Completed(flow)
        }
        Err(e) if interrupt::take() => {
            tracing::debug!(error = %e, "action failed after an interrupt");
            output::warning("Operation cancelled");
            Handled::Interrupted
        }
        Err(e) => report(&e),
    }
}

/// [`perform`], then wait for Enter unless the action asked not to
fn perform_and_pause<F>(session: &mut Session, action: F)
where
    F: FnOnce(&mut Session) -> Result<Flow>,
{
    if perform(session, action).flow() == Flow::Pause {
        output::pause();
    }
}

/// Run a whole submenu, containing errors and panics so the main loop survives
fn guarded<F>(entry: MainEntry, body: F) -> Handled
where
    F: FnOnce() -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Handled::Completed(Flow::Continue),
        Ok(Err(e)) => report(&e),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(entry = %entry, panic = %message, "menu action panicked");
            output::error(&format!("Internal error: {}", message));
            Handled::Panicked
        }
    }
}

/// Print an action failure; cancellations are not errors
fn report(err: &anyhow::Error) -> Handled {
    if error::is_cancelled(err) {
        output::warning("Operation cancelled");
        return Handled::Cancelled;
    }
    tracing::error!(error = ?err, "action failed");
    output::error(&format!("{:#}", err));
    if let Some(AssistError::StepFailed { step, source }) = err.downcast_ref::<AssistError>() {
        match source.exit_code() {
            Some(code) => output::info(&format!(
                "`{}` exited with status {}; check its output above.",
                step, code
            )),
            None => output::info(&format!("Check the output of `{}` above for details.", step)),
        }
    }
    Handled::Failed
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Shared submenu loop: draw the header, pick an entry, `Back` or a
/// cancelled prompt leaves
fn submenu<E, F>(session: &mut Session, title: &str, entries: &[E], back: E, mut handle: F) -> Result<()>
where
    E: Copy + PartialEq + fmt::Display,
    F: FnMut(&mut Session, E) -> Result<Flow>,
{
    loop {
        output::clear();
        output::header(title);
        output::kv("Project", &session.project.name());
        output::kv("Environment", &session.association_label());

        let choice = match prompt::select("Select an action", entries, None)? {
            Answer::Confirmed(index) => entries[index],
            Answer::Cancelled => back,
        };
        if choice == back {
            return Ok(());
        }
        perform_and_pause(session, |s| handle(s, choice));
    }
}

/// Write a launcher into the project root, asking before replacing one
fn write_launcher(session: &Session, launcher: &Launcher) -> Result<Flow> {
    let root = &session.project.root;
    let flavor = Flavor::native();
    let name = launcher.file_name(flavor);
    if root.join(&name).exists()
        && !prompt::confirm_destructive(&format!("{} already exists. Overwrite?", name))?
    {
        output::info("Launcher left unchanged.");
        return Ok(Flow::Pause);
    }

    let conda_init = match flavor {
        Flavor::Posix => launcher::conda_init_script(),
        Flavor::Batch => None,
    };
    if flavor == Flavor::Posix && conda_init.is_none() {
        output::warning(
            "conda.sh not found under CONDA_ROOT, CONDA_PREFIX or the CONDA_EXE install; the script will exit with an error",
        );
    }

    let path = launcher.write(root, flavor, conda_init.as_deref())?;
    output::success(&format!(
        "Launcher {} written, runs `{}`",
        paths::display_relative(&path, root),
        launcher.command()
    ));
    Ok(Flow::Pause)
}
