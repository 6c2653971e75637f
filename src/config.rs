//! Preparation settings
//!
//! Built-in defaults describe the libpff tree and its libyal dependencies.
//! An optional `pff-prep.toml` at the project root can override them:
//!
//! ```toml
//! url_template = "https://mirror.example/{name}/main.zip"
//! version = "20250601"
//! timeout_secs = 120
//! collision = "reject"
//!
//! [[substitution]]
//! token = "@HAVE_LIBBFIO@"
//! value = "1"
//! ```

use crate::core::error::PrepError;
use crate::extract::CollisionPolicy;
use crate::template::SubstitutionTable;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Marker file identifying the project root.
pub const ROOT_MARKER: &str = "setup.py";

/// Name of the optional settings file at the project root.
pub const CONFIG_FILE: &str = "pff-prep.toml";

/// The project's own source directory, verified alongside dependencies.
pub const PROJECT_SOURCE_DIR: &str = "libpff";

pub const DEFAULT_URL_TEMPLATE: &str =
    "https://github.com/libyal/{name}/archive/refs/heads/main.zip";

pub const DEFAULT_VERSION: &str = "20250101";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 300;

/// libyal libraries libpff builds against, in acquisition order.
pub const DEPENDENCY_NAMES: &[&str] = &[
    "libcerror",
    "libcthreads",
    "libcdata",
    "libclocale",
    "libcnotify",
    "libcsplit",
    "libuna",
    "libcfile",
    "libcpath",
    "libbfio",
    "libfcache",
    "libfdata",
    "libfdatetime",
    "libfguid",
    "libfvalue",
    "libfwnt",
    "libfmapi",
];

/// Autoconf values for a Windows/MSVC build, applied in this order.
const MSVC_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("@PACKAGE@", "libpff"),
    ("@VERSION@", DEFAULT_VERSION),
    ("@HAVE_WIDE_CHARACTER_TYPE@", "1"),
    ("@HAVE_MULTI_THREAD_SUPPORT@", "0"),
    ("@HAVE_LIBBFIO@", "0"),
    ("@HAVE_SYS_TYPES_H@", "0"),
    ("@HAVE_INTTYPES_H@", "0"),
    ("@HAVE_STDINT_H@", "1"),
    ("@HAVE_WCHAR_H@", "1"),
    ("@HAVE_SIZE32_T@", "0"),
    ("@HAVE_SSIZE32_T@", "0"),
    ("@HAVE_SIZE64_T@", "0"),
    ("@HAVE_SSIZE64_T@", "0"),
    ("@HAVE_OFF64_T@", "0"),
];

/// Project-relative directories scanned for templates besides the dependencies.
const PROJECT_SCAN_ROOTS: &[&str] = &["libpff", "common", "include/libpff", "include"];

/// Project-relative artifacts that must exist for the tree to be buildable.
const EXPECTED_ARTIFACTS: &[&str] = &[
    "common/types.h",
    "common/config.h",
    "include/libpff/types.h",
    "include/libpff/features.h",
    "include/libpff/definitions.h",
    "libpff/libpff_definitions.h",
];

/// A remote source dependency: a name and the archive URL it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    name: String,
    url_template: String,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The archive URL with `{name}` filled in.
    pub fn url(&self) -> String {
        self.url_template.replace("{name}", &self.name)
    }
}

/// Everything a preparation run needs to know.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub dependencies: Vec<DependencySpec>,
    pub substitutions: SubstitutionTable,
    pub version: String,
    pub timeout: Duration,
    pub collision: CollisionPolicy,
}

impl Settings {
    /// Built-in libpff settings rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let dependencies = DEPENDENCY_NAMES
            .iter()
            .map(|name| DependencySpec::new(*name, DEFAULT_URL_TEMPLATE))
            .collect();

        Self {
            root: root.into(),
            dependencies,
            substitutions: SubstitutionTable::from_pairs(MSVC_SUBSTITUTIONS.iter().copied()),
            version: DEFAULT_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            collision: CollisionPolicy::default(),
        }
    }

    /// Directory a dependency is extracted into.
    pub fn dependency_dir(&self, dep: &DependencySpec) -> PathBuf {
        self.root.join(dep.name())
    }

    /// Directories scanned for `.h.in` templates, in scan order.
    pub fn scan_roots(&self) -> Vec<PathBuf> {
        self.dependencies
            .iter()
            .map(|dep| self.dependency_dir(dep))
            .chain(PROJECT_SCAN_ROOTS.iter().map(|rel| self.root.join(rel)))
            .collect()
    }

    /// Source directories that must contain C sources after preparation.
    pub fn source_dirs(&self) -> Vec<(String, PathBuf)> {
        self.dependencies
            .iter()
            .map(|dep| dep.name())
            .chain(std::iter::once(PROJECT_SOURCE_DIR))
            .map(|name| (name.to_string(), self.root.join(name)))
            .collect()
    }

    pub fn expected_artifacts(&self) -> Vec<PathBuf> {
        EXPECTED_ARTIFACTS
            .iter()
            .map(|rel| self.root.join(rel))
            .collect()
    }

    pub fn config_header_path(&self) -> PathBuf {
        self.root.join("common").join("config.h")
    }

    /// Set the network timeout, clamped to a sane range.
    pub fn set_timeout_secs(&mut self, secs: u64) {
        self.timeout = Duration::from_secs(secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS));
    }

    /// Load `pff-prep.toml` from the root, if present, over the defaults.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, PrepError> {
        let mut settings = Self::new(root);
        let path = settings.root.join(CONFIG_FILE);
        if path.is_file() {
            settings.apply_file(&path)?;
        }
        Ok(settings)
    }

    /// Overlay a settings file onto these settings.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), PrepError> {
        let text = std::fs::read_to_string(path).map_err(|e| PrepError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let file: SettingsToml = toml::from_str(&text).map_err(|e| PrepError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "applying settings file");
        self.merge(file);
        Ok(())
    }

    fn merge(&mut self, file: SettingsToml) {
        let url_template = file.url_template.unwrap_or_else(|| {
            self.dependencies
                .first()
                .map(|d| d.url_template.clone())
                .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string())
        });
        let names: Vec<String> = match file.dependencies {
            Some(names) => names,
            None => self.dependencies.iter().map(|d| d.name.clone()).collect(),
        };
        self.dependencies = names
            .into_iter()
            .map(|name| DependencySpec::new(name, url_template.clone()))
            .collect();

        if let Some(version) = file.version {
            self.substitutions.set("@VERSION@", version.clone());
            self.version = version;
        }
        if let Some(secs) = file.timeout_secs {
            self.set_timeout_secs(secs);
        }
        if let Some(collision) = file.collision {
            self.collision = collision;
        }
        for entry in file.substitution {
            self.substitutions.set(entry.token, entry.value);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    url_template: Option<String>,
    dependencies: Option<Vec<String>>,
    version: Option<String>,
    timeout_secs: Option<u64>,
    collision: Option<CollisionPolicy>,
    #[serde(default)]
    substitution: Vec<SubstitutionToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubstitutionToml {
    token: String,
    value: String,
}

/// Find the project root: the executable's directory when it holds the
/// marker, otherwise the working directory, which must then hold it.
pub fn detect_root(exe_dir: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(dir) = exe_dir
        && dir.join(ROOT_MARKER).is_file()
    {
        return Some(dir.to_path_buf());
    }
    cwd.join(ROOT_MARKER).is_file().then(|| cwd.to_path_buf())
}
