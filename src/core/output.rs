//! Colored progress and report output
//!
//! Uses owo-colors for terminal colors. Everything the user is meant to read
//! goes through here; diagnostics go through `tracing`.

use owo_colors::OwoColorize;

/// Run banner naming the version and project root.
/// Example: "==> pff-prep 0.1.0 -- root: C:\src\libpff-main"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// One of the pipeline stages, counted against the total.
/// Example: "(2/5) Generating .h files from .h.in templates"
pub fn action_numbered(current: usize, total: usize, message: &str) {
    println!("{} {}", stage_counter(current, total).cyan(), message.bold());
}

/// A dependency about to be fetched, or a template being rendered.
/// Example: "  -> libcerror"
pub fn sub_action(message: &str) {
    println!("  {} {}", "->".cyan(), message);
}

/// Download size, extraction count, or a follow-up command.
/// Example: "     libcerror: extracted 42 files -> libcerror"
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Final verdict when the tree is ready to build.
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Stage totals.
/// Example: ":: Total generated: 31 header files"
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// A dependency left half-extracted by an earlier run.
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Failed downloads, failed extractions, and the not-ready verdict.
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// A dependency that is already complete on disk.
/// Example: "  -> libcerror: already complete, skipping"
pub fn skip(message: &str) {
    println!("  {} {}", "->".dimmed(), message.dimmed());
}

/// One verification check.
/// Example: "  [OK] libcerror/ -- 12 .c files"
pub fn status(ok: bool, message: &str) {
    if ok {
        println!("  {} {}", status_label(ok).green().bold(), message);
    } else {
        println!("  {} {}", status_label(ok).red().bold(), message.red());
    }
}

fn stage_counter(current: usize, total: usize) -> String {
    format!("({}/{})", current, total)
}

fn status_label(ok: bool) -> &'static str {
    if ok { "[OK]" } else { "[MISSING]" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_counter() {
        assert_eq!(stage_counter(2, 5), "(2/5)");
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(true), "[OK]");
        assert_eq!(status_label(false), "[MISSING]");
    }
}
