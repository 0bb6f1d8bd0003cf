mod registry;

pub use registry::EnvRegistry;

use crate::process::Invocation;

pub const CONDA: &str = "conda";

/// Name of the implicit default environment, never listed
pub const BASE_ENV: &str = "base";

/// `conda env list --json`
pub fn list_envs() -> Invocation {
    Invocation::new(CONDA).args(["env", "list", "--json"]).quiet()
}

/// `conda create -n <name> python=<version> -y`
pub fn create_env(name: &str, python_version: &str) -> Invocation {
    Invocation::new(CONDA)
        .args(["create", "-n", name])
        .arg(format!("python={}", python_version))
        .arg("-y")
        .streamed()
        .checked()
}

/// `conda create -n <name> nodejs pnpm -c conda-forge -y`
pub fn create_node_env(name: &str) -> Invocation {
    Invocation::new(CONDA)
        .args(["create", "-n", name, "nodejs", "pnpm", "-c", "conda-forge", "-y"])
        .streamed()
        .checked()
}

/// `conda env remove -n <name> -y`
pub fn remove_env(name: &str) -> Invocation {
    Invocation::new(CONDA)
        .args(["env", "remove", "-n", name, "-y"])
        .streamed()
        .checked()
}

/// `conda env export -n <name> --no-builds` (stdout is the YAML)
pub fn export_env(name: &str) -> Invocation {
    Invocation::new(CONDA)
        .args(["env", "export", "-n", name, "--no-builds"])
        .checked()
        .quiet()
}

/// `conda install -n <name> <pkg...> -y`
pub fn install_packages<S: AsRef<str>>(name: &str, packages: &[S]) -> Invocation {
    Invocation::new(CONDA)
        .args(["install", "-n", name])
        .args(packages.iter().map(|p| p.as_ref().to_string()))
        .arg("-y")
        .streamed()
        .checked()
}

/// `conda run -n <name> --no-capture-output <program> <args...>`
///
/// Runs inside the environment's activation context without an
/// interactive `conda activate`.
pub fn run_in<I, S>(env: &str, program: &str, args: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Invocation::new(CONDA)
        .args(["run", "-n", env, "--no-capture-output", program])
        .args(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_env_argv() {
        assert_eq!(
            create_env("demo", "3.11").argv(),
            vec!["conda", "create", "-n", "demo", "python=3.11", "-y"]
        );
    }

    #[test]
    fn test_create_node_env_argv() {
        assert_eq!(
            create_node_env("web").argv(),
            vec!["conda", "create", "-n", "web", "nodejs", "pnpm", "-c", "conda-forge", "-y"]
        );
    }

    #[test]
    fn test_remove_and_export_argv() {
        assert_eq!(
            remove_env("demo").argv(),
            vec!["conda", "env", "remove", "-n", "demo", "-y"]
        );
        let export = export_env("demo");
        assert_eq!(
            export.argv(),
            vec!["conda", "env", "export", "-n", "demo", "--no-builds"]
        );
        assert!(export.captures_output());
    }

    #[test]
    fn test_install_packages_argv() {
        let inv = install_packages("demo", &["numpy=1.26", "-c", "conda-forge"]);
        assert_eq!(
            inv.argv(),
            vec!["conda", "install", "-n", "demo", "numpy=1.26", "-c", "conda-forge", "-y"]
        );
    }

    #[test]
    fn test_run_in_prefix() {
        let inv = run_in("demo", "pip", ["install", "-r", "requirements.txt"]);
        assert_eq!(
            inv.argv(),
            vec![
                "conda",
                "run",
                "-n",
                "demo",
                "--no-capture-output",
                "pip",
                "install",
                "-r",
                "requirements.txt"
            ]
        );
    }
}
