//! Interactive prompts. Every prompt answers with [`Answer`], so a
//! cancelled prompt can't be mistaken for an empty value.

use std::fmt::Display;
use std::io;

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::AssistError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Confirmed(T),
    Cancelled,
}

impl<T> Answer<T> {
    /// The value, or `UserCancelled` for the menu loop to report
    pub fn required(self) -> Result<T, AssistError> {
        match self {
            Answer::Confirmed(value) => Ok(value),
            Answer::Cancelled => Err(AssistError::UserCancelled),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Answer::Confirmed(value) => Some(value),
            Answer::Cancelled => None,
        }
    }
}

impl<T> From<Option<T>> for Answer<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Answer::Cancelled, Answer::Confirmed)
    }
}

/// Turn Ctrl-C/Esc into `Cancelled`, anything else into an error
fn cancelled<T>(err: dialoguer::Error) -> Result<Answer<T>> {
    match err {
        dialoguer::Error::IO(ref e) if e.kind() == io::ErrorKind::Interrupted => {
            Ok(Answer::Cancelled)
        }
        other => Err(anyhow::Error::new(other).context("Failed to read from the terminal")),
    }
}

/// Free-text input. An empty answer with no default counts as cancelled.
pub fn text(prompt: &str, default: Option<&str>) -> Result<Answer<String>> {
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty(true);
    if let Some(default) = default.filter(|d| !d.is_empty()) {
        input = input.default(default.to_string());
    }

    match input.interact_text() {
        Ok(value) => Ok(non_empty(value)),
        Err(e) => cancelled(e),
    }
}

fn non_empty(value: String) -> Answer<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Answer::Cancelled
    } else {
        Answer::Confirmed(trimmed.to_string())
    }
}

/// Pick one item; returns its index
pub fn select<T: Display>(prompt: &str, items: &[T], default: Option<usize>) -> Result<Answer<usize>> {
    if items.is_empty() {
        anyhow::bail!("Nothing to choose from for: {}", prompt);
    }
    let labels: Vec<String> = items.iter().map(ToString::to_string).collect();
    let theme = ColorfulTheme::default();
    let select = Select::with_theme(&theme)
        .with_prompt(prompt)
        .items(&labels)
        .default(default.filter(|&i| i < labels.len()).unwrap_or(0));

    match select.interact_opt() {
        Ok(choice) => Ok(choice.into()),
        Err(e) => cancelled(e),
    }
}

/// Yes/no question
pub fn confirm(prompt: &str, default: bool) -> Result<Answer<bool>> {
    let theme = ColorfulTheme::default();
    let confirm = Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(default);

    match confirm.interact_opt() {
        Ok(answer) => Ok(answer.into()),
        Err(e) => cancelled(e),
    }
}

/// Destructive-action confirmation: only an explicit yes proceeds
pub fn confirm_destructive(prompt: &str) -> Result<bool> {
    Ok(confirm(prompt, false)?.ok().unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  demo ".to_string()), Answer::Confirmed("demo".to_string()));
        assert_eq!(non_empty("   ".to_string()), Answer::Cancelled);
    }

    #[test]
    fn test_required() {
        assert_eq!(Answer::Confirmed(3).required().unwrap(), 3);
        assert!(matches!(
            Answer::<i32>::Cancelled.required(),
            Err(AssistError::UserCancelled)
        ));
    }

    #[test]
    fn test_interrupted_read_is_cancel() {
        let err = dialoguer::Error::IO(io::Error::new(io::ErrorKind::Interrupted, "read interrupted"));
        assert!(matches!(cancelled::<String>(err), Ok(Answer::Cancelled)));

        let err = dialoguer::Error::IO(io::Error::new(io::ErrorKind::Other, "not a terminal"));
        assert!(cancelled::<String>(err).is_err());
    }
}
