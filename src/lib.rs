//! Prepares a libpff source tree for a native Windows/MSVC build
//!
//! libpff's build expects its libyal dependencies checked out next to it and
//! a set of headers that autoconf would normally generate. This crate does
//! both without autoconf:
//!
//! 1. Downloads each dependency's branch archive and extracts its sources,
//!    headers, header templates and `Makefile.am` flat into `<root>/<dep>/`.
//!    Dependencies already holding sources and templates are left alone.
//! 2. Renders every `*.h.in` in the dependency directories, `libpff/`,
//!    `common/`, `include/libpff/` and `include/` with the MSVC values.
//! 3. Writes `setup.cfg` and `common/config.h`.
//! 4. Checks that every source directory has C files and that the headers
//!    the build includes exist.
//!
//! # Example
//!
//! ```no_run
//! use libpff_prep::{HttpFetcher, Settings, pipeline};
//!
//! let settings = Settings::load("/src/libpff-main")?;
//! let summary = pipeline::run(&HttpFetcher::new(), &settings)?;
//! assert!(summary.ready());
//! # Ok::<(), libpff_prep::PrepError>(())
//! ```

pub mod acquire;
pub mod artifacts;
pub mod config;
mod core;
pub mod extract;
pub mod pipeline;
pub mod template;
pub mod verify;

pub use acquire::{AcquireReport, CompletionStatus, Fetcher, HttpFetcher, Outcome};
pub use config::{DependencySpec, Settings};
pub use crate::core::error::{AcquireError, ExtractError, FetchError, PrepError};
pub use crate::core::output;
pub use extract::{ArchiveMember, CollisionPolicy};
pub use template::SubstitutionTable;
