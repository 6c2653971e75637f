//! Flattened extraction of dependency sources
//!
//! GitHub branch archives are laid out as `<dep>-main/<dep>/...`. Only members
//! under the `<dep>` directory that look like C sources, headers, header
//! templates or the automake descriptor are kept, and each is written
//! straight into the destination directory under its own file name.
//!
//! Members at any depth below `<dep>/` qualify, so `<dep>/sub/x.c` lands as
//! `x.c`. Two members with the same file name collide; [`CollisionPolicy`]
//! decides what happens.

use crate::core::error::ExtractError;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

/// File name suffixes that are extracted.
pub const ACCEPTED_SUFFIXES: &[&str] = &[".c", ".h", ".h.in"];

/// Build descriptor extracted alongside the sources.
pub const BUILD_DESCRIPTOR: &str = "Makefile.am";

const ZIP_MAGIC: &[u8] = b"PK";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// What to do when two kept members flatten to the same file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The member enumerated later overwrites the earlier one.
    #[default]
    LastWins,
    /// Fail the extraction before anything is written.
    Reject,
}

/// One file inside a fetched archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub components: Vec<String>,
    pub data: Vec<u8>,
}

impl ArchiveMember {
    pub fn new(path: &str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            components: split_path(path),
            data: data.into(),
        }
    }

    pub fn path(&self) -> String {
        self.components.join("/")
    }

    /// The last path component, used as the output file name.
    pub fn file_name(&self) -> &str {
        self.components.last().map(String::as_str).unwrap_or("")
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/').map(str::to_string).collect()
}

/// Whether a member path belongs to `dep` and is worth extracting.
pub fn keeps(components: &[String], dep: &str) -> bool {
    if components.len() < 3 || components[1] != dep {
        return false;
    }
    let name = components[components.len() - 1].as_str();
    !name.is_empty()
        && (name == BUILD_DESCRIPTOR || ACCEPTED_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

/// Read the members of `bytes` that [`keeps`] accepts for `dep`, in archive
/// order. Zip and gzip-compressed tar are recognised by their magic bytes.
pub fn read_members(bytes: &[u8], dep: &str) -> Result<Vec<ArchiveMember>, ExtractError> {
    if bytes.starts_with(ZIP_MAGIC) {
        read_zip(bytes, dep)
    } else if bytes.starts_with(GZIP_MAGIC) {
        read_tar_gz(bytes, dep)
    } else {
        Err(ExtractError::UnsupportedFormat)
    }
}

fn read_zip(bytes: &[u8], dep: &str) -> Result<Vec<ArchiveMember>, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Archive(format!("zip read error: {}", e)))?;

    let mut members = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::Archive(format!("zip entry error: {}", e)))?;
        if file.is_dir() {
            continue;
        }

        let components = split_path(file.name());
        if !keeps(&components, dep) {
            continue;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(|e| {
            ExtractError::Archive(format!("zip read error for {}: {}", file.name(), e))
        })?;
        members.push(ArchiveMember { components, data });
    }
    Ok(members)
}

fn read_tar_gz(bytes: &[u8], dep: &str) -> Result<Vec<ArchiveMember>, ExtractError> {
    let decoder = flate2::read::GzDecoder::new(Cursor::new(bytes));
    let mut archive = tar::Archive::new(decoder);

    let mut members = Vec::new();
    for entry in archive
        .entries()
        .map_err(|e| ExtractError::Archive(format!("tar read error: {}", e)))?
    {
        let mut entry =
            entry.map_err(|e| ExtractError::Archive(format!("tar entry error: {}", e)))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let components = split_path(&path);
        if !keeps(&components, dep) {
            continue;
        }

        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| ExtractError::Archive(format!("tar read error for {}: {}", path, e)))?;
        members.push(ArchiveMember { components, data });
    }
    Ok(members)
}

/// Decide which member each output file comes from.
///
/// Returns the members to write, in order. Under `LastWins` every member is
/// written and later ones overwrite earlier ones of the same name; under
/// `Reject` any shared file name is an error.
pub fn plan(
    members: &[ArchiveMember],
    policy: CollisionPolicy,
) -> Result<Vec<&ArchiveMember>, ExtractError> {
    if policy == CollisionPolicy::Reject {
        let mut seen: HashMap<&str, &ArchiveMember> = HashMap::new();
        for member in members {
            if let Some(first) = seen.insert(member.file_name(), member) {
                return Err(ExtractError::Collision {
                    name: member.file_name().to_string(),
                    first: first.path(),
                    second: member.path(),
                });
            }
        }
    }
    Ok(members.iter().collect())
}

/// Extract the qualifying members of an archive for `dep` into `dest`,
/// flattened. Returns the number of members written.
///
/// An archive with no qualifying members is an error; `dest` is still
/// created.
pub fn extract(
    bytes: &[u8],
    dep: &str,
    dest: &Path,
    policy: CollisionPolicy,
) -> Result<usize, ExtractError> {
    std::fs::create_dir_all(dest).map_err(|e| ExtractError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let members = read_members(bytes, dep)?;
    let planned = plan(&members, policy)?;
    if planned.is_empty() {
        return Err(ExtractError::NoMembers {
            dep: dep.to_string(),
        });
    }

    for member in &planned {
        let target = dest.join(member.file_name());
        std::fs::write(&target, &member.data).map_err(|e| ExtractError::Write {
            path: target.clone(),
            source: e,
        })?;
        tracing::trace!(member = %member.path(), "extracted");
    }

    Ok(planned.len())
}
