//! `pnpm-lock.yaml` parser.
//!
//! The lockfile is scanned line by line rather than parsed as YAML. Two kinds
//! of dependency block are read. Older lockfiles list direct dependencies at
//! the top level:
//!
//! ```yaml
//! dependencies:
//!   lodash: 4.17.21
//!   '@babel/core': registry.npmjs.org/@babel/core/7.22.0
//!   react:
//!     specifier: ^18.2.0
//!     version: 18.2.0
//! ```
//!
//! Workspace lockfiles (and every lockfile from v9 on) nest them under an
//! importer:
//!
//! ```yaml
//! importers:
//!   .:
//!     dependencies:
//!       react:
//!         specifier: ^18.2.0
//!         version: 18.2.0(loose-envify@1.4.0)
//! ```
//!
//! Package names are the keys one level below the block header. The flat
//! `name: version` form yields the first semver-shaped substring of the
//! value; the nested form takes its version from the `version:` child.
//! `dependencies:` keys inside `packages:` or `snapshots:` describe
//! transitive edges and are not read.

use regex::Regex;
use std::sync::LazyLock;

use super::{ManifestFormat, ManifestParser};
use crate::model::{DeclarationKind, InstalledPackage};

static SEMVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)").expect("semver regex")
});

/// Indent of a dependency header inside `importers:`.
const IMPORTER_BLOCK_INDENT: usize = 4;

const NESTING_STEP: usize = 2;

/// Classification of a single `pnpm-lock.yaml` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnpmLine<'a> {
    Blank,
    /// A `key: value` line. `value` is empty for mapping keys.
    Key {
        indent: usize,
        name: &'a str,
        value: &'a str,
    },
    /// A non-blank line without a colon.
    Other { indent: usize },
}

impl<'a> PnpmLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        let line = line.trim_end();
        let content = line.trim_start_matches(' ');
        if content.is_empty() {
            return PnpmLine::Blank;
        }

        let indent = line.len() - content.len();
        match content.split_once(':') {
            Some((name, value)) => PnpmLine::Key {
                indent,
                name: unquote(name.trim()),
                value: value.trim(),
            },
            None => PnpmLine::Other { indent },
        }
    }

    fn indent(&self) -> Option<usize> {
        match self {
            PnpmLine::Blank => None,
            PnpmLine::Key { indent, .. } | PnpmLine::Other { indent } => Some(*indent),
        }
    }
}

fn unquote(name: &str) -> &str {
    name.trim_matches(|c| c == '\'' || c == '"')
}

fn is_dependency_header(name: &str, value: &str) -> bool {
    value.is_empty() && matches!(name, "dependencies" | "devDependencies")
}

fn extract_version(value: &str) -> &str {
    SEMVER_PATTERN
        .find(value)
        .map(|m| m.as_str())
        .unwrap_or(value)
}

/// Line-by-line state for the pnpm parser.
///
/// `section` is the current unindented key. `block` is the indent of the
/// open dependency header; it closes at the next line indented no deeper.
/// `pending` holds a package whose version is given in a nested
/// `version:` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PnpmLockState {
    section: Option<String>,
    block: Option<usize>,
    pending: Option<String>,
}

impl PnpmLockState {
    pub fn in_dependencies(&self) -> bool {
        self.block.is_some()
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn feed(&mut self, line: &str) -> Option<InstalledPackage> {
        let parsed = PnpmLine::classify(line);
        let indent = parsed.indent()?;

        if self.block.is_some_and(|header| indent <= header) {
            self.block = None;
            self.pending = None;
        }

        let PnpmLine::Key { name, value, .. } = parsed else {
            return None;
        };

        if indent == 0 {
            self.section = Some(name.to_string());
        }

        let Some(header) = self.block else {
            if is_dependency_header(name, value) && self.opens_block(indent) {
                self.block = Some(indent);
            }
            return None;
        };

        if indent == header + NESTING_STEP {
            self.pending = None;
            // Keys starting with '/' are resolution paths, not names.
            if name.is_empty() || name.starts_with('/') {
                return None;
            }
            if value.is_empty() {
                self.pending = Some(name.to_string());
                return None;
            }
            return Some(InstalledPackage::new(
                name,
                extract_version(value),
                DeclarationKind::PnpmLock,
            ));
        }

        if name == "version" && !value.is_empty() {
            let name = self.pending.take()?;
            return Some(InstalledPackage::new(
                name,
                extract_version(value),
                DeclarationKind::PnpmLock,
            ));
        }

        None
    }

    fn opens_block(&self, indent: usize) -> bool {
        indent == 0
            || (indent == IMPORTER_BLOCK_INDENT && self.section.as_deref() == Some("importers"))
    }
}

pub struct PnpmLockParser;

impl PnpmLockParser {
    /// Extracts the first semver-shaped substring, or returns the raw value.
    ///
    /// ```
    /// use pkgscan::parser::PnpmLockParser;
    ///
    /// assert_eq!(PnpmLockParser::extract_version("registry.npmjs.org/lodash/4.17.21"), "4.17.21");
    /// assert_eq!(PnpmLockParser::extract_version("link:../shared"), "link:../shared");
    /// ```
    pub fn extract_version(value: &str) -> &str {
        extract_version(value)
    }
}

impl ManifestParser for PnpmLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PnpmLock
    }

    fn parse(&self, content: &str) -> Vec<InstalledPackage> {
        let mut state = PnpmLockState::default();
        content
            .lines()
            .filter_map(|line| state.feed(line))
            .collect()
    }
}
