//! Manifest and lockfile parsers.
//!
//! This module provides the [`ManifestParser`] trait and one implementation
//! per supported file format. Every parser turns raw file text into
//! [`InstalledPackage`] records and is tolerant of malformed input: a file
//! it cannot understand yields an empty list rather than an error.
//!
//! # Supported Formats
//!
//! | Format | File name | Parser | Package manager |
//! |--------|-----------|--------|-----------------|
//! | [`ManifestFormat::PackageJson`] | `package.json` | [`PackageJsonParser`] | npm |
//! | [`ManifestFormat::PackageLock`] | `package-lock.json` | [`PackageLockParser`] | npm |
//! | [`ManifestFormat::YarnLock`] | `yarn.lock` | [`YarnLockParser`] | yarn |
//! | [`ManifestFormat::PnpmLock`] | `pnpm-lock.yaml` | [`PnpmLockParser`] | pnpm |
//!
//! # Example
//!
//! ```
//! use pkgscan::parser::ManifestFormat;
//!
//! let parser = ManifestFormat::YarnLock.parser();
//! let packages = parser.parse("leftpad@^1.0.0:\n  version \"1.3.0\"\n");
//! assert_eq!(packages[0].name, "leftpad");
//! assert_eq!(packages[0].version, "1.3.0");
//! ```

mod package_json;
mod package_lock;
mod pnpm_lock;
mod yarn_lock;

pub use package_json::PackageJsonParser;
pub use package_lock::PackageLockParser;
pub use pnpm_lock::{PnpmLine, PnpmLockParser, PnpmLockState};
pub use yarn_lock::{YarnLine, YarnLockParser, YarnLockState};

use std::path::Path;

use crate::model::{InstalledPackage, PackageManager};

/// The fixed set of supported dependency file formats.
///
/// [`ManifestFormat::ALL`] is also the order in which the scan engine
/// processes formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestFormat {
    PackageJson,
    PackageLock,
    YarnLock,
    PnpmLock,
}

impl ManifestFormat {
    pub const ALL: [ManifestFormat; 4] = [
        ManifestFormat::PackageJson,
        ManifestFormat::PackageLock,
        ManifestFormat::YarnLock,
        ManifestFormat::PnpmLock,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestFormat::PackageJson => "package.json",
            ManifestFormat::PackageLock => "package-lock.json",
            ManifestFormat::YarnLock => "yarn.lock",
            ManifestFormat::PnpmLock => "pnpm-lock.yaml",
        }
    }

    pub fn package_manager(&self) -> PackageManager {
        match self {
            ManifestFormat::PackageJson | ManifestFormat::PackageLock => PackageManager::Npm,
            ManifestFormat::YarnLock => PackageManager::Yarn,
            ManifestFormat::PnpmLock => PackageManager::Pnpm,
        }
    }

    /// Returns the format whose file name matches `path`, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| format.file_name() == file_name)
    }

    pub fn parser(&self) -> &'static dyn ManifestParser {
        match self {
            ManifestFormat::PackageJson => &PackageJsonParser,
            ManifestFormat::PackageLock => &PackageLockParser,
            ManifestFormat::YarnLock => &YarnLockParser,
            ManifestFormat::PnpmLock => &PnpmLockParser,
        }
    }
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Turns the text of one dependency file into installed package records.
pub trait ManifestParser: Send + Sync {
    /// Returns the format this parser handles.
    fn format(&self) -> ManifestFormat;

    /// Parses `content`. Malformed input yields an empty list.
    fn parse(&self, content: &str) -> Vec<InstalledPackage>;
}
