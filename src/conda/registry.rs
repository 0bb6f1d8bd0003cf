use serde::Deserialize;

use super::{list_envs, BASE_ENV};
use crate::error::{AssistError, ExecError};
use crate::output;
use crate::process::Runner;

/// Shape of `conda env list --json`
#[derive(Debug, Deserialize)]
struct EnvListing {
    #[serde(default)]
    envs: Vec<String>,
}

/// Parse the JSON listing into environment names, manager order preserved.
///
/// The name is the final path segment; `base` is dropped whatever its case.
pub fn parse_env_list(json: &str) -> Result<Vec<String>, serde_json::Error> {
    let listing: EnvListing = serde_json::from_str(json)?;
    Ok(listing
        .envs
        .iter()
        .filter_map(|path| env_name_from_path(path))
        .filter(|name| !name.eq_ignore_ascii_case(BASE_ENV))
        .map(str::to_string)
        .collect())
}

/// Final segment of a prefix path, accepting either separator
fn env_name_from_path(path: &str) -> Option<&str> {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

/// Known Conda environments, queried lazily and cached until invalidated
pub struct EnvRegistry<'r> {
    runner: &'r dyn Runner,
    cache: Option<Vec<String>>,
}

impl<'r> EnvRegistry<'r> {
    pub fn new(runner: &'r dyn Runner) -> Self {
        Self {
            runner,
            cache: None,
        }
    }

    /// Environment names in manager order. Failures are reported and
    /// yield an empty list; they never propagate.
    pub fn list(&mut self, use_cache: bool) -> Vec<String> {
        if use_cache {
            if let Some(ref cached) = self.cache {
                return cached.clone();
            }
        }

        let envs = match self.query() {
            Ok(envs) => envs,
            Err(e) => {
                tracing::warn!(error = %e, "conda environment query failed");
                output::error(&format!("Could not list Conda environments: {}", e));
                Vec::new()
            }
        };
        self.cache = Some(envs.clone());
        envs
    }

    fn query(&self) -> Result<Vec<String>, AssistError> {
        let invocation = list_envs();
        let result = self.runner.run(&invocation)?;
        if !result.success() {
            return Err(ExecError::CommandFailed {
                command: invocation.as_string(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            }
            .into());
        }
        if result.stdout.trim().is_empty() {
            return Ok(Vec::new());
        }
        parse_env_list(&result.stdout).map_err(|source| AssistError::MalformedOutput {
            command: invocation.as_string(),
            source,
        })
    }

    /// Canonical casing of an existing environment, matched case-insensitively.
    /// The first match in manager order wins.
    pub fn find_by_name(&mut self, query: &str, use_cache: bool) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_lowercase();
        self.list(use_cache)
            .into_iter()
            .find(|name| name.to_lowercase() == query)
    }

    pub fn exists(&mut self, query: &str, use_cache: bool) -> bool {
        self.find_by_name(query, use_cache).is_some()
    }

    /// Drop the cached listing; the next read re-queries
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}
