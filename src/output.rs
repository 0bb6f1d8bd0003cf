//! Styled terminal output. Colours drop out automatically when the
//! stream is not a terminal.

use std::time::Duration;

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// `Creating demo (Python 3.10)` with a bold cyan verb
pub fn status(prefix: &str, message: &str) {
    println!("{} {}", style(prefix).cyan().bold(), message);
}

pub fn info(message: &str) {
    println!("{}", style(message).blue());
}

pub fn success(message: &str) {
    println!("{}", style(message).green());
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("warning:").yellow().for_stderr(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("error:").red().for_stderr(), message);
}

/// Section title, one blank line above
pub fn header(message: &str) {
    println!("\n{}", style(format!("==> {}", message)).magenta().bold());
}

pub fn list_item(item: &str) {
    println!("  {} {}", style("-").dim(), item);
}

pub fn kv(key: &str, value: &str) {
    println!("  {} {}", style(format!("{}:", key)).dim(), value);
}

/// A command the user may want to copy
pub fn command(cmd: &str) {
    println!("{}", style(format!("$ {}", cmd)).dim());
}

/// Echo captured stdout of a finished command
pub fn captured(stdout: &str) {
    for line in stdout.lines() {
        println!("  {line}");
    }
}

/// Echo captured stderr; lines that look like failures stand out
pub fn captured_stderr(stderr: &str) {
    for line in stderr.lines() {
        let styled = style(line).for_stderr();
        if line.contains("error") || line.contains("Error") || line.contains("fatal:") {
            eprintln!("  {}", styled.red());
        } else {
            eprintln!("  {}", styled.dim());
        }
    }
}

/// Horizontal rule around streamed subprocess output
pub fn rule() {
    println!("{}", style("-".repeat(40)).dim());
}

/// Spinner for silent queries that may take a while
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Clear the screen when attached to a terminal
pub fn clear() {
    let term = Term::stdout();
    if term.is_term() {
        let _ = term.clear_screen();
    }
}

/// Block until the user presses enter
pub fn pause() {
    let term = Term::stdout();
    let _ = term.write_str(&style("Press Enter to continue...").dim().to_string());
    let _ = term.read_line();
}
