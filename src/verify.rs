//! Build readiness checks
//!
//! Every check runs and is reported, pass or fail; the verdict is the AND of
//! all of them.

use crate::acquire::SOURCE_SUFFIX;
use crate::core::output;
use std::path::{Path, PathBuf};

/// One line of the readiness report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// A source directory and how many C sources it holds.
    Sources { name: String, count: usize },
    /// An artifact that must exist.
    Artifact { path: PathBuf, exists: bool },
}

impl Check {
    pub fn passed(&self) -> bool {
        match self {
            Check::Sources { count, .. } => *count > 0,
            Check::Artifact { exists, .. } => *exists,
        }
    }

    fn describe(&self) -> String {
        match self {
            Check::Sources { name, count } => {
                format!("{}/ -- {} {} files", name, count, SOURCE_SUFFIX)
            }
            Check::Artifact { path, .. } => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub checks: Vec<Check>,
}

impl VerificationReport {
    pub fn ready(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }

    /// Print every check in order.
    pub fn print(&self) {
        for check in &self.checks {
            output::status(check.passed(), &check.describe());
        }
    }
}

/// Count files directly in `dir` with the primary source suffix.
pub fn count_sources(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| {
                    e.file_name()
                        .to_str()
                        .is_some_and(|n| n.ends_with(SOURCE_SUFFIX))
                })
                .count()
        })
        .unwrap_or(0)
}

/// Check every source directory and expected artifact.
pub fn verify(source_dirs: &[(String, PathBuf)], expected: &[PathBuf]) -> VerificationReport {
    let sources = source_dirs.iter().map(|(name, dir)| Check::Sources {
        name: name.clone(),
        count: count_sources(dir),
    });
    let artifacts = expected.iter().map(|path| Check::Artifact {
        path: path.clone(),
        exists: path.exists(),
    });

    VerificationReport {
        checks: sources.chain(artifacts).collect(),
    }
}
