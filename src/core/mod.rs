//! Shared infrastructure: errors, console output, progress bars.

pub mod error;
pub mod output;
pub mod progress;
