//! Fixed platform artifacts: `common/config.h` and `setup.cfg`.

use crate::core::error::PrepError;
use crate::template::{self, SubstitutionTable};
use std::path::{Path, PathBuf};

/// Minimal MSVC configuration; autoconf never runs on Windows so this stands
/// in for its output.
pub const MSVC_CONFIG_H: &str = "\
/* config.h - Windows/MSVC minimal configuration
 * Generated by pff-prep */
#ifndef CONFIG_H
#define CONFIG_H

#define WINAPI_USE_PREFIXED_FUNCTIONS   1
#define HAVE_WIDE_CHARACTER_TYPE        1
#define HAVE_WCHAR_H                    1
#define HAVE_STDINT_H                   1
#define HAVE_STRING_H                   1
#define HAVE_MEMORY_H                   1
#define HAVE_STDLIB_H                   1
#define HAVE_SYS_TYPES_H                0
#define HAVE_INTTYPES_H                 0
#define HAVE_UNISTD_H                   0
#define HAVE_OFF64_T                    0
#define HAVE_SIZE32_T                   0
#define HAVE_SSIZE32_T                  0
#define HAVE_SIZE64_T                   0
#define HAVE_SSIZE64_T                  0
#define HAVE_PRINTF_JD                  0
#define HAVE_PRINTF_ZD                  0
#define HAVE_PTHREAD_H                  0
#define HAVE_LOCAL_LIBCERROR            1

#endif /* CONFIG_H */
";

/// Write the MSVC `config.h` to `path`, replacing whatever is there.
pub fn write_config_header(path: &Path) -> Result<(), PrepError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| PrepError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, MSVC_CONFIG_H).map_err(|e| PrepError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// How `setup.cfg` was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupCfg {
    /// Rendered from `setup.cfg.in`.
    Rendered(PathBuf),
    /// No template; a minimal file was written instead.
    Minimal(PathBuf),
}

/// Produce `setup.cfg` in `root` for `version`.
///
/// Only `@VERSION@` is substituted; other placeholders default to `0`.
pub fn write_setup_cfg(root: &Path, version: &str) -> Result<SetupCfg, PrepError> {
    let template_path = root.join("setup.cfg.in");
    let dest = root.join("setup.cfg");

    if template_path.exists() {
        let text =
            std::fs::read_to_string(&template_path).map_err(|e| PrepError::TemplateRead {
                path: template_path.clone(),
                source: e,
            })?;
        let table = SubstitutionTable::from_pairs([("@VERSION@", version)]);
        std::fs::write(&dest, template::render(&text, &table)).map_err(|e| {
            PrepError::Write {
                path: dest.clone(),
                source: e,
            }
        })?;
        Ok(SetupCfg::Rendered(dest))
    } else {
        let minimal = format!("[metadata]\nname = pypff\nversion = {}\n", version);
        std::fs::write(&dest, minimal).map_err(|e| PrepError::Write {
            path: dest.clone(),
            source: e,
        })?;
        Ok(SetupCfg::Minimal(dest))
    }
}
