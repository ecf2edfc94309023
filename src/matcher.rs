//! Matching installed packages against the compromised registry.
//!
//! Matching is by exact name and, when the registry lists versions, by exact
//! version string. There is no semver range evaluation: a manifest range
//! such as `^1.2.3` does not match a listed `1.2.3`.

use crate::model::{CompromisedFinding, InstalledPackage};
use crate::registry::{Registry, ResolvedRegistry};

/// An installed package that is on the compromised list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMatch {
    pub name: String,
    /// `None` when the registry entry is name-only.
    pub version: Option<String>,
}

impl PackageMatch {
    pub fn is_any_version(&self) -> bool {
        self.version.is_none()
    }
}

/// Returns the installed records that are on the compromised list, in input
/// order.
///
/// # Example
///
/// ```
/// use pkgscan::matcher::find_compromised;
/// use pkgscan::model::{DeclarationKind, InstalledPackage};
/// use pkgscan::registry::Registry;
///
/// let registry = Registry::parse("evil-pkg:1.0.0\nbadlib\n");
/// let installed = vec![
///     InstalledPackage::new("evil-pkg", "1.0.0", DeclarationKind::Runtime),
///     InstalledPackage::new("badlib", "2.0.0", DeclarationKind::Runtime),
///     InstalledPackage::new("lodash", "4.17.21", DeclarationKind::Runtime),
/// ];
///
/// let matches = find_compromised(&installed, &registry);
/// assert_eq!(matches.len(), 2);
/// assert_eq!(matches[0].version.as_deref(), Some("1.0.0"));
/// assert!(matches[1].is_any_version());
/// ```
pub fn find_compromised(installed: &[InstalledPackage], registry: &Registry) -> Vec<PackageMatch> {
    installed
        .iter()
        .filter_map(|package| match_package(package, registry))
        .collect()
}

fn match_package(package: &InstalledPackage, registry: &Registry) -> Option<PackageMatch> {
    let versions = registry.versions(&package.name)?;

    if versions.is_empty() {
        return Some(PackageMatch {
            name: package.name.clone(),
            version: None,
        });
    }

    if versions.iter().any(|v| *v == package.version) {
        return Some(PackageMatch {
            name: package.name.clone(),
            version: Some(package.version.clone()),
        });
    }

    None
}

/// Matches and attaches provenance from the resolved registry.
pub fn match_findings(
    installed: &[InstalledPackage],
    resolved: &ResolvedRegistry,
) -> Vec<CompromisedFinding> {
    find_compromised(installed, &resolved.registry)
        .into_iter()
        .map(|m| {
            let provenance = resolved.provenance_of(&m.name);
            CompromisedFinding::new(m.name, m.version, provenance)
        })
        .collect()
}
