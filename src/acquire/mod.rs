//! Dependency acquisition
//!
//! Each dependency lives in its own directory under the project root. A
//! directory that already holds both C sources and header templates is
//! complete and never re-fetched; anything else is downloaded and extracted
//! again. Failures are collected per dependency so one bad download does not
//! stop the rest of the batch.

pub mod http;

use crate::config::{DependencySpec, Settings};
use crate::core::error::{AcquireError, FetchError, PrepError};
use crate::core::output;
use crate::extract::{self, CollisionPolicy};
use crate::template::TEMPLATE_SUFFIX;
use std::path::Path;
use std::time::Duration;

pub use http::HttpFetcher;

/// Suffix of the primary source files.
pub const SOURCE_SUFFIX: &str = ".c";

/// Retrieves raw archive bytes.
pub trait Fetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// How much of a dependency is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// No directory, or neither sources nor templates in it.
    Missing,
    /// Sources or templates, but not both.
    Partial,
    /// Both sources and templates are present.
    Complete,
}

impl CompletionStatus {
    /// Inspect the file names directly inside `dir`.
    pub fn of(dir: &Path) -> Self {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Self::Missing;
        };

        let mut has_source = false;
        let mut has_template = false;
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                has_source |= name.ends_with(SOURCE_SUFFIX);
                has_template |= name.ends_with(TEMPLATE_SUFFIX);
            }
        }

        match (has_source, has_template) {
            (true, true) => Self::Complete,
            (false, false) => Self::Missing,
            _ => Self::Partial,
        }
    }
}

/// Result of acquiring one dependency.
#[derive(Debug)]
pub enum Outcome {
    /// Already complete; nothing was fetched.
    Skipped,
    /// Fetched and extracted this many files.
    Extracted(usize),
    Failed(AcquireError),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Per-dependency outcomes of one acquisition batch, in declared order.
#[derive(Debug, Default)]
pub struct AcquireReport {
    pub outcomes: Vec<(String, Outcome)>,
}

impl AcquireReport {
    /// Names of the dependencies that failed.
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn fetched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Outcome::Extracted(_)))
            .count()
    }

    /// Turn any failure into the batch-level error.
    pub fn into_result(self) -> Result<Self, PrepError> {
        let failed: Vec<String> = self.failed().into_iter().map(String::from).collect();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(PrepError::AcquisitionFailed { deps: failed })
        }
    }
}

/// Make sure one dependency's sources are present in `dest`.
pub fn acquire(
    fetcher: &dyn Fetcher,
    dep: &DependencySpec,
    dest: &Path,
    timeout: Duration,
    policy: CollisionPolicy,
) -> Outcome {
    let name = dep.name();
    match CompletionStatus::of(dest) {
        CompletionStatus::Complete => {
            output::skip(&format!("{}: already complete, skipping", name));
            return Outcome::Skipped;
        }
        CompletionStatus::Partial => {
            output::warning(&format!(
                "{}: re-downloading (incomplete from previous run)",
                name
            ));
        }
        CompletionStatus::Missing => {
            output::sub_action(name);
        }
    }

    let url = dep.url();
    tracing::debug!(dep = name, url = %url, "fetching");
    let bytes = match fetcher.fetch(&url, timeout) {
        Ok(bytes) => bytes,
        Err(e) => {
            output::error(&format!("{}: download failed: {}", name, e));
            return Outcome::Failed(e.into());
        }
    };
    output::detail(&format!("downloaded {} ({} KB)", name, bytes.len() / 1024));

    match extract::extract(&bytes, name, dest, policy) {
        Ok(count) => {
            output::detail(&format!(
                "{}: extracted {} files -> {}",
                name,
                count,
                dest.display()
            ));
            Outcome::Extracted(count)
        }
        Err(e) => {
            output::error(&format!("{}: extraction failed: {}", name, e));
            Outcome::Failed(e.into())
        }
    }
}

/// Acquire every configured dependency in order, never stopping early.
pub fn acquire_all(fetcher: &dyn Fetcher, settings: &Settings) -> AcquireReport {
    let outcomes = settings
        .dependencies
        .iter()
        .map(|dep| {
            let dest = settings.dependency_dir(dep);
            let outcome = acquire(fetcher, dep, &dest, settings.timeout, settings.collision);
            (dep.name().to_string(), outcome)
        })
        .collect();

    AcquireReport { outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ExtractError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::{Cursor, Write};
    use tempfile::tempdir;

    /// Serves canned archives and records every URL asked for.
    #[derive(Default)]
    struct CannedFetcher {
        archives: HashMap<String, Vec<u8>>,
        calls: RefCell<Vec<String>>,
    }

    impl CannedFetcher {
        fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
            self.archives.insert(url.to_string(), bytes);
            self
        }
    }

    impl Fetcher for CannedFetcher {
        fn fetch(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            self.archives
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    code: 404,
                })
        }
    }

    fn dep_zip(dep: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for name in ["a.c", "a.h.in", "Makefile.am"] {
            zip.start_file(format!("{dep}-main/{dep}/{name}"), options)
                .unwrap();
            zip.write_all(b"/* src */").unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    const TEMPLATE: &str = "http://archives.test/{name}.zip";

    #[test]
    fn test_completion_status() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("libx");
        assert_eq!(CompletionStatus::of(&dir), CompletionStatus::Missing);

        std::fs::create_dir(&dir).unwrap();
        assert_eq!(CompletionStatus::of(&dir), CompletionStatus::Missing);

        std::fs::write(dir.join("x.c"), "").unwrap();
        assert_eq!(CompletionStatus::of(&dir), CompletionStatus::Partial);

        std::fs::write(dir.join("x.h.in"), "").unwrap();
        assert_eq!(CompletionStatus::of(&dir), CompletionStatus::Complete);
    }

    #[test]
    fn test_completion_status_templates_only_is_partial() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("x.h.in"), "").unwrap();
        std::fs::write(temp.path().join("x.h"), "").unwrap();
        assert_eq!(CompletionStatus::of(temp.path()), CompletionStatus::Partial);
    }

    #[test]
    fn test_acquire_skips_complete_dir() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("x.c"), "").unwrap();
        std::fs::write(temp.path().join("x.h.in"), "").unwrap();
        let fetcher = CannedFetcher::default();
        let dep = DependencySpec::new("libx", TEMPLATE);

        let outcome = acquire(
            &fetcher,
            &dep,
            temp.path(),
            Duration::from_secs(5),
            CollisionPolicy::LastWins,
        );

        assert!(matches!(outcome, Outcome::Skipped));
        assert!(fetcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_acquire_refetches_partial_dir() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("libx");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("old.c"), "").unwrap();
        let fetcher =
            CannedFetcher::default().with("http://archives.test/libx.zip", dep_zip("libx"));
        let dep = DependencySpec::new("libx", TEMPLATE);

        let outcome = acquire(
            &fetcher,
            &dep,
            &dest,
            Duration::from_secs(5),
            CollisionPolicy::LastWins,
        );

        assert!(matches!(outcome, Outcome::Extracted(3)));
        assert_eq!(CompletionStatus::of(&dest), CompletionStatus::Complete);
        assert_eq!(*fetcher.calls.borrow(), ["http://archives.test/libx.zip"]);
    }

    #[test]
    fn test_acquire_zero_members_fails() {
        let temp = tempdir().unwrap();
        let fetcher =
            CannedFetcher::default().with("http://archives.test/libx.zip", dep_zip("liby"));
        let dep = DependencySpec::new("libx", TEMPLATE);

        let outcome = acquire(
            &fetcher,
            &dep,
            &temp.path().join("libx"),
            Duration::from_secs(5),
            CollisionPolicy::LastWins,
        );

        assert!(matches!(
            outcome,
            Outcome::Failed(AcquireError::Extract(ExtractError::NoMembers { .. }))
        ));
    }

    #[test]
    fn test_acquire_all_continues_after_failure() {
        let temp = tempdir().unwrap();
        let mut settings = Settings::new(temp.path());
        settings.dependencies = ["liba", "libb", "libc"]
            .iter()
            .map(|n| DependencySpec::new(*n, TEMPLATE))
            .collect();
        let fetcher = CannedFetcher::default()
            .with("http://archives.test/liba.zip", dep_zip("liba"))
            .with("http://archives.test/libc.zip", dep_zip("libc"));

        let report = acquire_all(&fetcher, &settings);

        assert_eq!(fetcher.calls.borrow().len(), 3);
        assert_eq!(report.failed(), ["libb"]);
        assert_eq!(report.fetched(), 2);
        match report.into_result() {
            Err(PrepError::AcquisitionFailed { deps }) => assert_eq!(deps, ["libb"]),
            other => panic!("expected acquisition failure, got {other:?}"),
        }
    }

    #[test]
    fn test_acquire_all_is_idempotent() {
        let temp = tempdir().unwrap();
        let mut settings = Settings::new(temp.path());
        settings.dependencies = vec![DependencySpec::new("liba", TEMPLATE)];
        let fetcher =
            CannedFetcher::default().with("http://archives.test/liba.zip", dep_zip("liba"));

        acquire_all(&fetcher, &settings).into_result().unwrap();
        assert_eq!(fetcher.calls.borrow().len(), 1);

        let second = acquire_all(&fetcher, &settings).into_result().unwrap();
        assert_eq!(fetcher.calls.borrow().len(), 1);
        assert!(matches!(second.outcomes[0].1, Outcome::Skipped));
    }
}
