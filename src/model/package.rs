use serde::{Deserialize, Serialize};

/// The package manager a manifest or lockfile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a dependency record came from inside its file.
///
/// Manifest groups carry declared version ranges; the lockfile kinds carry
/// resolved versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    #[serde(rename = "dependencies")]
    Runtime,
    #[serde(rename = "devDependencies")]
    Dev,
    #[serde(rename = "peerDependencies")]
    Peer,
    #[serde(rename = "optionalDependencies")]
    Optional,
    #[serde(rename = "package-lock.json")]
    NpmLock,
    #[serde(rename = "yarn.lock")]
    YarnLock,
    #[serde(rename = "pnpm-lock.yaml")]
    PnpmLock,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Runtime => "dependencies",
            DeclarationKind::Dev => "devDependencies",
            DeclarationKind::Peer => "peerDependencies",
            DeclarationKind::Optional => "optionalDependencies",
            DeclarationKind::NpmLock => "package-lock.json",
            DeclarationKind::YarnLock => "yarn.lock",
            DeclarationKind::PnpmLock => "pnpm-lock.yaml",
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dependency record extracted from a manifest or lockfile.
///
/// `version` is the literal string found in the file. For manifest groups it
/// is usually a range such as `^1.2.3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    #[serde(rename = "source")]
    pub declaration: DeclarationKind,
}

impl InstalledPackage {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        declaration: DeclarationKind,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            declaration,
        }
    }
}
