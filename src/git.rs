//! Global Git proxy settings.

use crate::error::ExecError;
use crate::process::{CommandResult, Invocation, Runner};

pub const GIT: &str = "git";

/// Config keys the proxy is written to
pub const PROXY_KEYS: [&str; 2] = ["http.proxy", "https.proxy"];

/// `git config --global` exits 5 when asked to unset a missing key
const EXIT_KEY_ABSENT: i32 = 5;

/// `git config --global <key> <url>`
pub fn set_proxy_invocation(key: &str, url: &str) -> Invocation {
    Invocation::new(GIT)
        .args(["config", "--global", key, url])
        .checked()
}

/// `git config --global --unset <key>`
pub fn unset_proxy_invocation(key: &str) -> Invocation {
    Invocation::new(GIT).args(["config", "--global", "--unset", key])
}

/// Set both proxy keys, stopping at the first failure
pub fn set_proxy(runner: &dyn Runner, url: &str) -> Result<(), ExecError> {
    for key in PROXY_KEYS {
        runner.run(&set_proxy_invocation(key, url))?;
    }
    tracing::info!(url, "git proxy set");
    Ok(())
}

/// An unset counts as done when the key is gone afterwards,
/// including when it was never there
pub fn unset_succeeded(result: &CommandResult) -> bool {
    result.success()
        || result.exit_code == EXIT_KEY_ABSENT
        || result.stderr.to_lowercase().contains("not found")
}

/// Result of clearing both keys
#[derive(Debug, Default)]
pub struct UnsetReport {
    pub cleared: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

/// Unset both proxy keys. Failures are collected, not raised.
pub fn unset_proxy(runner: &dyn Runner) -> UnsetReport {
    let mut report = UnsetReport::default();
    for key in PROXY_KEYS {
        match runner.run(&unset_proxy_invocation(key)) {
            Ok(result) if unset_succeeded(&result) => report.cleared.push(key),
            Ok(result) => report.failed.push((key, result.stderr.trim().to_string())),
            Err(e) => report.failed.push((key, e.to_string())),
        }
    }
    report
}
