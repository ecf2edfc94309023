//! `yarn.lock` parser.
//!
//! ```text
//! "@babel/core@^7.0.0", "@babel/core@^7.1.0":
//!   version "7.1.2"
//!   resolved "https://registry.yarnpkg.com/..."
//! ```
//!
//! Each unindented declaration line names a package; the version range in
//! the key is discarded and the following `version` line supplies the
//! resolved version. Both the classic (`version "1.2.3"`) and berry
//! (`version: 1.2.3`) forms are accepted.

use regex::Regex;
use std::sync::LazyLock;

use super::{ManifestFormat, ManifestParser};
use crate::model::{DeclarationKind, InstalledPackage};

static DECLARATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"?(@?[^@"\s,]+)@.*:$"#).expect("yarn declaration regex")
});

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s+version:?\s+"?([^"\s]+)"?$"#).expect("yarn version regex")
});

/// Classification of a single `yarn.lock` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YarnLine<'a> {
    /// A package key line; carries the package name.
    Declaration(&'a str),
    /// A resolved version line.
    Version(&'a str),
    Other,
}

impl<'a> YarnLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return YarnLine::Other;
        }

        if let Some(caps) = DECLARATION_PATTERN.captures(line) {
            if let Some(name) = caps.get(1) {
                return YarnLine::Declaration(name.as_str());
            }
        }

        if let Some(caps) = VERSION_PATTERN.captures(line) {
            if let Some(version) = caps.get(1) {
                return YarnLine::Version(version.as_str());
            }
        }

        YarnLine::Other
    }
}

/// Line-by-line state for the yarn parser.
///
/// | State | Input | Next state | Emits |
/// |-------|-------|------------|-------|
/// | any | declaration `name` | pending `name` | nothing |
/// | pending `name` | version `v` | idle | `(name, v)` |
/// | idle | version | idle | nothing |
/// | any | other | unchanged | nothing |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YarnLockState {
    pending: Option<String>,
}

impl YarnLockState {
    /// The package waiting for its version line, if any.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn feed(&mut self, line: &str) -> Option<InstalledPackage> {
        match YarnLine::classify(line) {
            YarnLine::Declaration(name) => {
                // A declaration without a version line is dropped here.
                self.pending = Some(name.to_string());
                None
            }
            YarnLine::Version(version) => {
                let name = self.pending.take()?;
                Some(InstalledPackage::new(
                    name,
                    version,
                    DeclarationKind::YarnLock,
                ))
            }
            YarnLine::Other => None,
        }
    }
}

pub struct YarnLockParser;

impl ManifestParser for YarnLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::YarnLock
    }

    fn parse(&self, content: &str) -> Vec<InstalledPackage> {
        let mut state = YarnLockState::default();
        content
            .lines()
            .filter_map(|line| state.feed(line))
            .collect()
    }
}
