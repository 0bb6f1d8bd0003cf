use anyhow::{Context, Result};
use directories::BaseDirs;
use pinyin::ToPinyin;
use std::path::{Path, PathBuf};

/// Name of the settings file kept in the user's home directory
pub const CONFIG_FILE_NAME: &str = ".env_assist_tool_config.ini";

/// Environment name used when nothing better can be derived
pub const FALLBACK_ENV_NAME: &str = "my_env";

/// Get the user's home directory
pub fn home_dir() -> Result<PathBuf> {
    let dirs = BaseDirs::new().context("Could not determine the home directory for your platform")?;
    Ok(dirs.home_dir().to_path_buf())
}

/// Get the path of the settings file
/// - Linux/macOS: ~/.env_assist_tool_config.ini
/// - Windows: C:\Users\<user>\.env_assist_tool_config.ini
pub fn config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(CONFIG_FILE_NAME))
}

/// Suggested Conda environment name for a project directory.
///
/// Han characters are spelled out in toneless pinyin first. The result is
/// lowercased, every run of non-word characters becomes `_` and
/// underscores are trimmed from both ends.
pub fn default_env_name(project_dir: &Path) -> String {
    let Some(base) = project_dir.file_name().map(|n| n.to_string_lossy()) else {
        return FALLBACK_ENV_NAME.to_string();
    };

    let mut sanitized = String::with_capacity(base.len());
    let mut in_run = false;
    for c in transliterate(&base).chars() {
        if c.is_alphanumeric() || c == '_' {
            sanitized.extend(c.to_lowercase());
            in_run = false;
        } else if !in_run {
            sanitized.push('_');
            in_run = true;
        }
    }

    let trimmed = sanitized.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_ENV_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Replace CJK ideographs with their plain pinyin, leaving everything else
fn transliterate(name: &str) -> String {
    if !name.chars().any(is_han) {
        return name.to_string();
    }
    name.chars()
        .fold(String::with_capacity(name.len() * 3), |mut out, c| {
            match c.to_pinyin() {
                Some(pinyin) => out.push_str(pinyin.plain()),
                None => out.push(c),
            }
            out
        })
}

fn is_han(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Path relative to `base` for display, falling back to the full path
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_in_home() {
        let path = config_path().unwrap();
        assert!(path.ends_with(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_default_env_name() {
        assert_eq!(default_env_name(Path::new("/work/My-Project")), "my_project");
        assert_eq!(default_env_name(Path::new("/work/api  server.v2")), "api_server_v2");
        assert_eq!(default_env_name(Path::new("/work/__tool__")), "tool");
        assert_eq!(default_env_name(Path::new("/work/---")), FALLBACK_ENV_NAME);
        assert_eq!(default_env_name(Path::new("/")), FALLBACK_ENV_NAME);
    }

    #[test]
    fn test_default_env_name_non_ascii() {
        assert_eq!(default_env_name(Path::new("/w/我的项目")), "wodexiangmu");
        assert_eq!(default_env_name(Path::new("/w/数据-api")), "shuju_api");
        assert_eq!(default_env_name(Path::new("/w/Café-App")), "café_app");
    }

    #[test]
    fn test_display_relative() {
        let base = Path::new("/work/app");
        assert_eq!(
            display_relative(Path::new("/work/app/.env/demo.yml"), base),
            ".env/demo.yml"
        );
        assert_eq!(display_relative(Path::new("/other/x"), base), "/other/x");
    }
}
