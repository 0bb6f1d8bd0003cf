//! Dependency installation into a Conda environment.
//!
//! The plan is chosen from marker files in the project root;
//! `requirements.txt` takes precedence over `pyproject.toml`. Multi-step
//! plans stop at the first failing step.

use std::fmt;
use std::path::Path;

use crate::conda;
use crate::error::AssistError;
use crate::output;
use crate::process::{Invocation, Runner};
use crate::project::{PACKAGE_JSON, PYPROJECT_TOML, REQUIREMENTS_TXT};

/// Which pipeline a Python root calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPlan {
    NoManifest,
    /// `pip install -r requirements.txt`
    Requirements,
    /// bootstrap Poetry with pip, then `poetry install`
    Poetry,
}

impl InstallPlan {
    pub fn for_root(root: &Path) -> Self {
        if root.join(REQUIREMENTS_TXT).is_file() {
            InstallPlan::Requirements
        } else if root.join(PYPROJECT_TOML).is_file() {
            InstallPlan::Poetry
        } else {
            InstallPlan::NoManifest
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            InstallPlan::NoManifest => "no installable manifest",
            InstallPlan::Requirements => "pip install -r requirements.txt",
            InstallPlan::Poetry => "pip install poetry, then poetry install",
        }
    }
}

/// One external step of an install pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    PipRequirements,
    PoetryBootstrap,
    PoetryInstall,
    PnpmInstall,
    PipreqsBootstrap,
    PipreqsGenerate,
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallStep::PipRequirements => "pip install -r requirements.txt",
            InstallStep::PoetryBootstrap => "pip install poetry",
            InstallStep::PoetryInstall => "poetry install",
            InstallStep::PnpmInstall => "pnpm install",
            InstallStep::PipreqsBootstrap => "pip install pipreqs",
            InstallStep::PipreqsGenerate => "pipreqs",
        };
        f.write_str(label)
    }
}

impl InstallStep {
    /// The in-environment invocation for this step
    fn invocation(self, root: &Path, env: &str) -> Invocation {
        let inv = match self {
            InstallStep::PipRequirements => {
                conda::run_in(env, "pip", ["install", "-r", REQUIREMENTS_TXT]).cwd(root)
            }
            InstallStep::PoetryBootstrap => conda::run_in(env, "pip", ["install", "poetry"]),
            InstallStep::PoetryInstall => conda::run_in(env, "poetry", ["install"]).cwd(root),
            InstallStep::PnpmInstall => conda::run_in(env, "pnpm", ["install"]).cwd(root),
            InstallStep::PipreqsBootstrap => conda::run_in(env, "pip", ["install", "pipreqs"]),
            InstallStep::PipreqsGenerate => {
                conda::run_in(env, "pipreqs", [".", "--force", "--encoding=utf-8"]).cwd(root)
            }
        };
        inv.streamed().checked()
    }
}

/// Run steps in order, stopping at the first failure
fn run_steps(
    runner: &dyn Runner,
    root: &Path,
    env: &str,
    steps: &[InstallStep],
) -> Result<(), AssistError> {
    for &step in steps {
        output::status("Step", &format!("{} (env: {})", step, env));
        runner
            .run(&step.invocation(root, env))
            .map_err(|source| AssistError::StepFailed { step, source })?;
        output::success(&format!("{} succeeded", step));
    }
    Ok(())
}

/// Install a Python project's dependencies into `env`
pub fn install_python(
    runner: &dyn Runner,
    root: &Path,
    env: &str,
) -> Result<InstallPlan, AssistError> {
    let plan = InstallPlan::for_root(root);
    let steps: &[InstallStep] = match plan {
        InstallPlan::Requirements => &[InstallStep::PipRequirements],
        InstallPlan::Poetry => &[InstallStep::PoetryBootstrap, InstallStep::PoetryInstall],
        InstallPlan::NoManifest => {
            return Err(AssistError::ManifestAbsent {
                root: root.to_path_buf(),
            })
        }
    };
    tracing::info!(env, plan = ?plan, "installing python dependencies");
    run_steps(runner, root, env, steps)?;
    Ok(plan)
}

/// `pnpm install` inside `env`; needs a package.json
pub fn install_node(runner: &dyn Runner, root: &Path, env: &str) -> Result<(), AssistError> {
    if !root.join(PACKAGE_JSON).is_file() {
        return Err(AssistError::ManifestAbsent {
            root: root.to_path_buf(),
        });
    }
    run_steps(runner, root, env, &[InstallStep::PnpmInstall])
}

/// Generate requirements.txt from imports with pipreqs (bootstrapped first)
pub fn generate_requirements(
    runner: &dyn Runner,
    root: &Path,
    env: &str,
) -> Result<(), AssistError> {
    run_steps(
        runner,
        root,
        env,
        &[InstallStep::PipreqsBootstrap, InstallStep::PipreqsGenerate],
    )
}
