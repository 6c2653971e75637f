//! Autoconf-style template rendering
//!
//! Turns `foo.h.in` into `foo.h` by replacing `@TOKEN@` placeholders. Known
//! tokens come from an ordered [`SubstitutionTable`]; anything still shaped
//! like a placeholder afterwards becomes `0`.

use crate::core::error::PrepError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Suffix of files the engine renders.
pub const TEMPLATE_SUFFIX: &str = ".h.in";

/// Trailing part stripped from a template path to name its output.
const INPUT_SUFFIX: &str = ".in";

/// Value given to placeholders the table does not cover.
const DEFAULT_VALUE: &str = "0";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+@").expect("valid placeholder regex"));

/// Ordered token -> literal replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: Vec<(String, String)>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, T, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, V)>,
        T: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::new();
        for (token, value) in pairs {
            table.set(token, value);
        }
        table
    }

    /// Set a token's value. Existing tokens keep their position; new ones
    /// are appended.
    pub fn set(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every literal occurrence of every token.
    ///
    /// The text is scanned once from the left. At each position the first
    /// table entry whose token matches wins, and its value is emitted as-is:
    /// substituted text is never scanned again.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            let hit = self
                .entries
                .iter()
                .find(|(token, _)| !token.is_empty() && rest.starts_with(token.as_str()));

            match hit {
                Some((token, value)) => {
                    out.push_str(value);
                    rest = &rest[token.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }

        out
    }
}

/// Replace any remaining `@NAME@` placeholder with `0`.
pub fn default_placeholders(text: &str) -> String {
    PLACEHOLDER_RE.replace_all(text, DEFAULT_VALUE).into_owned()
}

/// Apply the table, then default whatever placeholders are left.
pub fn render(text: &str, table: &SubstitutionTable) -> String {
    default_placeholders(&table.apply(text))
}

/// Output path for a template: the template path without its trailing `.in`.
pub fn generated_path(template: &Path) -> Option<PathBuf> {
    let name = template.file_name()?.to_str()?;
    let stem = name.strip_suffix(INPUT_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(template.with_file_name(stem))
}

/// Render one template file next to itself, returning the generated path.
///
/// The output is overwritten unconditionally.
pub fn generate(template: &Path, table: &SubstitutionTable) -> Result<PathBuf, PrepError> {
    let bytes = std::fs::read(template).map_err(|e| PrepError::TemplateRead {
        path: template.to_path_buf(),
        source: e,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let dest = generated_path(template).ok_or_else(|| PrepError::TemplateRead {
        path: template.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "template name does not end in .in",
        ),
    })?;

    std::fs::write(&dest, render(&text, table)).map_err(|e| PrepError::Write {
        path: dest.clone(),
        source: e,
    })?;

    tracing::debug!(template = %template.display(), "rendered template");
    Ok(dest)
}

/// Templates directly inside `dir`, sorted by name. Subdirectories are not
/// searched; a missing directory has no templates.
pub fn templates_in(dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let list_err = |e| PrepError::ListDir {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut templates = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let is_template = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(TEMPLATE_SUFFIX));
        if is_template && entry.path().is_file() {
            templates.push(entry.path());
        }
    }
    templates.sort();
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table(pairs: &[(&str, &str)]) -> SubstitutionTable {
        SubstitutionTable::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_render_defaults_unknown_tokens() {
        let out = render("#define A @A@\n#define B @B@\n", &table(&[("@A@", "1")]));
        assert_eq!(out, "#define A 1\n#define B 0\n");
    }

    #[test]
    fn test_apply_does_not_rescan_substituted_text() {
        let t = table(&[("@A@", "@B@"), ("@B@", "2")]);
        assert_eq!(t.apply("@A@"), "@B@");
        assert_eq!(t.apply("@B@"), "2");
    }

    #[test]
    fn test_apply_earlier_entry_wins_on_overlap() {
        let t = table(&[("@HAVE@", "x"), ("@HAVE", "y")]);
        assert_eq!(t.apply("@HAVE@"), "x");

        let t = table(&[("@HAVE", "y"), ("@HAVE@", "x")]);
        assert_eq!(t.apply("@HAVE@"), "y@");
    }

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let t = table(&[("@V@", "20250101")]);
        assert_eq!(t.apply("@V@ and @V@"), "20250101 and 20250101");
    }

    #[test]
    fn test_apply_missing_token_is_noop() {
        let t = table(&[("@NOPE@", "1")]);
        assert_eq!(t.apply("plain text"), "plain text");
    }

    #[test]
    fn test_apply_is_literal_not_regex() {
        let t = table(&[("a.c", "X")]);
        assert_eq!(t.apply("abc a.c"), "abc X");
    }

    #[test]
    fn test_apply_keeps_multibyte_text() {
        let t = table(&[("@A@", "1")]);
        assert_eq!(t.apply("é @A@ ü"), "é 1 ü");
    }

    #[test]
    fn test_default_placeholders() {
        assert_eq!(default_placeholders("@A@@B_2@"), "00");
        assert_eq!(default_placeholders("@@A@"), "@0");
        assert_eq!(default_placeholders("a@b.com @ @-@"), "a@b.com @ @-@");
    }

    #[test]
    fn test_set_keeps_position() {
        let mut t = table(&[("@A@", "1"), ("@B@", "2")]);
        t.set("@A@", "9");
        t.set("@C@", "3");
        let pairs: Vec<_> = t.iter().collect();
        assert_eq!(pairs, [("@A@", "9"), ("@B@", "2"), ("@C@", "3")]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_generated_path() {
        assert_eq!(
            generated_path(Path::new("common/types.h.in")),
            Some(PathBuf::from("common/types.h"))
        );
        assert_eq!(generated_path(Path::new("common/types.h")), None);
        assert_eq!(generated_path(Path::new(".in")), None);
    }

    #[test]
    fn test_generate_writes_next_to_template() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("features.h.in");
        std::fs::write(&src, "#define X @HAVE_X@\n#define V @VERSION@\n").unwrap();
        std::fs::write(temp.path().join("features.h"), "stale").unwrap();

        let dest = generate(&src, &table(&[("@VERSION@", "20250101")])).unwrap();

        assert_eq!(dest, temp.path().join("features.h"));
        assert_eq!(
            std::fs::read_to_string(dest).unwrap(),
            "#define X 0\n#define V 20250101\n"
        );
    }

    #[test]
    fn test_generate_missing_template_is_read_error() {
        let temp = tempdir().unwrap();
        let err = generate(&temp.path().join("gone.h.in"), &SubstitutionTable::new()).unwrap_err();
        assert!(matches!(err, PrepError::TemplateRead { .. }));
    }

    #[test]
    fn test_generate_tolerates_invalid_utf8() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("odd.h.in");
        std::fs::write(&src, b"/* \xff */ @A@\n").unwrap();

        let dest = generate(&src, &SubstitutionTable::new()).unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "/* \u{fffd} */ 0\n");
    }

    #[test]
    fn test_templates_in_is_flat_and_sorted() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("b.h.in"), "").unwrap();
        std::fs::write(temp.path().join("a.h.in"), "").unwrap();
        std::fs::write(temp.path().join("a.h"), "").unwrap();
        std::fs::write(temp.path().join("setup.cfg.in"), "").unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested/c.h.in"), "").unwrap();

        let found = templates_in(temp.path()).unwrap();
        assert_eq!(
            found,
            [temp.path().join("a.h.in"), temp.path().join("b.h.in")]
        );
    }

    #[test]
    fn test_templates_in_missing_dir() {
        let temp = tempdir().unwrap();
        assert!(templates_in(&temp.path().join("absent")).unwrap().is_empty());
    }
}
