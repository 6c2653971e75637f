//! Progress bar helpers
//!
//! Keeps spinner styling consistent between downloads and extraction.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

const TICK_INTERVAL_MS: u64 = 80;

/// Create a spinner with standard styling.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("     {spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

/// Upgrade a spinner to a byte progress bar once the content length is known.
pub fn upgrade_to_bytes(pb: &ProgressBar, total_bytes: u64) {
    pb.set_length(total_bytes);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("━╸━"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_upgrades_to_bytes() {
        let pb = spinner("downloading libcerror");
        upgrade_to_bytes(&pb, 4096);
        pb.set_position(1024);
        assert_eq!(pb.length(), Some(4096));
        assert_eq!(pb.position(), 1024);
        pb.finish_and_clear();
    }
}
