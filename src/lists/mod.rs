//! Package list parsing.
//!
//! A list file names one or more packages per line. Everything from the first
//! `#`, `*` or `;` onward is a comment, which also consumes markdown `#`
//! headings and org-mode `*` headings whole. A token prefixed with `&` is an
//! optional dependency: kept if already explicit, never installed.
//!
//! ```text
//! # Base system          <- markdown heading, ignored
//! base linux linux-firmware
//! neovim   ; editor      <- trailing comment
//! &python-pynvim         <- optional dependency
//! ```
pub mod set;

use std::path::{Path, PathBuf};

pub use set::{PackageDeclaration, PackageSet};

use crate::error::ParseError;

/// Characters that start a comment.
const COMMENT_MARKERS: [char; 3] = ['#', '*', ';'];

/// Marker for an optional dependency declaration.
const OPTIONAL_MARKER: char = '&';

/// Surface syntax of a list file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// Plain text (`.txt` or anything unrecognised).
    Plain,
    /// Markdown (`.md`, `.markdown`).
    Markdown,
    /// Emacs org-mode outline (`.org`).
    Org,
}

impl ListFormat {
    /// Pick the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("md" | "markdown") => Self::Markdown,
            Some("org") => Self::Org,
            _ => Self::Plain,
        }
    }

    /// Whether a leading `-`/`+`/`1.` token is a list bullet in this format.
    const fn has_bullets(self) -> bool {
        matches!(self, Self::Markdown | Self::Org)
    }
}

fn is_bullet(token: &str) -> bool {
    matches!(token, "-" | "+")
        || token
            .strip_suffix(['.', ')'])
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn is_fence(token: &str) -> bool {
    token.starts_with("```") || token.starts_with("~~~")
}

fn declaration(token: &str) -> Option<PackageDeclaration> {
    match token.strip_prefix(OPTIONAL_MARKER) {
        Some("") => None,
        Some(name) => Some(PackageDeclaration::optional(name)),
        None => Some(PackageDeclaration::required(token)),
    }
}

/// Parse a single line into declarations.
#[must_use]
pub fn parse_line(line: &str, format: ListFormat) -> Vec<PackageDeclaration> {
    let content = line.split(COMMENT_MARKERS).next().unwrap_or_default();
    let mut tokens = content.split_whitespace().peekable();

    if format == ListFormat::Markdown && tokens.peek().is_some_and(|t| is_fence(t)) {
        return Vec::new();
    }
    if format.has_bullets() && tokens.peek().is_some_and(|t| is_bullet(t)) {
        tokens.next();
    }

    tokens.filter_map(declaration).collect()
}

/// Parse the full contents of one list file.
#[must_use]
pub fn parse_str(content: &str, format: ListFormat) -> PackageSet {
    content
        .lines()
        .flat_map(|line| parse_line(line, format))
        .collect()
}

/// Read and parse one list file.
///
/// # Errors
///
/// Returns [`ParseError::Unreadable`] if the file cannot be read as UTF-8.
pub fn load_file(path: &Path) -> Result<PackageSet, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_str(&content, ListFormat::from_path(path)))
}

/// Outcome of loading every list file of one invocation.
#[derive(Debug, Default)]
pub struct LoadedLists {
    /// Union of all readable files.
    pub packages: PackageSet,
    /// Files that were read successfully.
    pub read: Vec<PathBuf>,
    /// Files that could not be read; their packages are excluded.
    pub errors: Vec<ParseError>,
}

/// Read every list and union the results.
///
/// Unreadable files do not abort loading; they are collected in
/// [`LoadedLists::errors`] for the caller to report.
#[must_use]
pub fn load_all(paths: &[PathBuf]) -> LoadedLists {
    let mut loaded = LoadedLists::default();
    for path in paths {
        match load_file(path) {
            Ok(set) => {
                tracing::debug!("{}: {} package(s)", path.display(), set.len());
                loaded.packages.union_with(set);
                loaded.read.push(path.clone());
            }
            Err(e) => loaded.errors.push(e),
        }
    }
    loaded
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn names(set: &PackageSet) -> Vec<String> {
        set.iter().map(|d| d.name).collect()
    }

    #[test]
    fn trailing_comment_is_stripped() {
        assert_eq!(
            parse_line("package2 # comment", ListFormat::Plain),
            vec![PackageDeclaration::required("package2")]
        );
    }

    #[test]
    fn optional_marker_is_stripped() {
        assert_eq!(
            parse_line("&optional_dependency_for_package2", ListFormat::Plain),
            vec![PackageDeclaration::optional(
                "optional_dependency_for_package2"
            )]
        );
    }

    #[test]
    fn bare_optional_marker_is_ignored() {
        assert!(parse_line("&", ListFormat::Plain).is_empty());
        assert!(parse_line("  &   ", ListFormat::Org).is_empty());
    }

    #[test]
    fn multiple_packages_per_line() {
        let decls = parse_line("  base\tlinux  &linux-docs ", ListFormat::Plain);
        assert_eq!(
            decls,
            vec![
                PackageDeclaration::required("base"),
                PackageDeclaration::required("linux"),
                PackageDeclaration::optional("linux-docs"),
            ]
        );
    }

    #[test]
    fn all_comment_markers_recognised() {
        assert_eq!(
            parse_line("a;b", ListFormat::Plain),
            vec![PackageDeclaration::required("a")]
        );
        assert_eq!(
            parse_line("c*d", ListFormat::Plain),
            vec![PackageDeclaration::required("c")]
        );
        assert!(parse_line("; whole line", ListFormat::Plain).is_empty());
    }

    #[test]
    fn empty_and_blank_lines_yield_nothing() {
        assert!(parse_line("", ListFormat::Plain).is_empty());
        assert!(parse_line("   \t ", ListFormat::Markdown).is_empty());
    }

    #[test]
    fn markdown_document() {
        let doc = "\
# Packages

## Desktop
- firefox
- &firefox-ublock-origin # optional
1. mpv

```
htop
```
";
        let set = parse_str(doc, ListFormat::Markdown);
        assert_eq!(
            names(&set),
            vec!["firefox", "firefox-ublock-origin", "htop", "mpv"]
        );
        assert_eq!(set.optional_names().len(), 1);
    }

    #[test]
    fn org_document() {
        let doc = "\
#+TITLE: my packages
* Base
** Shell
zsh fzf
- ripgrep
+ &bat-extras
";
        let set = parse_str(doc, ListFormat::Org);
        assert_eq!(names(&set), vec!["bat-extras", "fzf", "ripgrep", "zsh"]);
        assert!(set.get("bat-extras").unwrap().optional);
    }

    #[test]
    fn plain_format_has_no_bullets() {
        // Bullets are only structural in markdown and org.
        let decls = parse_line("1. x", ListFormat::Plain);
        assert_eq!(decls.len(), 2);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ListFormat::from_path(Path::new("packages.md")),
            ListFormat::Markdown
        );
        assert_eq!(
            ListFormat::from_path(Path::new("host.ORG")),
            ListFormat::Org
        );
        assert_eq!(
            ListFormat::from_path(Path::new("packages.txt")),
            ListFormat::Plain
        );
        assert_eq!(ListFormat::from_path(Path::new("noext")), ListFormat::Plain);
    }

    #[test]
    fn load_all_is_order_independent() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.org");
        std::fs::write(&a, "vim\n&git\n").unwrap();
        std::fs::write(&b, "* Heading\ngit\n&tmux\n").unwrap();

        let ab = load_all(&[a.clone(), b.clone()]);
        let ba = load_all(&[b, a]);
        assert_eq!(ab.packages, ba.packages);
        assert_eq!(
            ab.packages.get("git"),
            Some(PackageDeclaration::required("git"))
        );
    }

    #[test]
    fn load_all_collects_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("packages.txt");
        std::fs::write(&good, "base\n").unwrap();
        let missing = dir.path().join("missing.txt");

        let loaded = load_all(&[missing, good.clone()]);
        assert_eq!(loaded.read, vec![good]);
        assert_eq!(loaded.errors.len(), 1);
        assert!(loaded.packages.contains("base"));
        assert!(
            loaded.errors[0].to_string().contains("missing.txt"),
            "error should name the file"
        );
    }
}
