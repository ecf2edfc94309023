//! `package-lock.json` parser.
//!
//! Two layouts exist in the wild:
//!
//! ```json
//! {
//!   "lockfileVersion": 3,
//!   "packages": {
//!     "": { "name": "my-app", "version": "1.0.0" },
//!     "node_modules/lodash": { "version": "4.17.21" }
//!   }
//! }
//! ```
//!
//! and the legacy v1 form, `"dependencies": { "lodash": { "version": "4.17.21" } }`.
//! Lockfile v2 carries both. The `packages` layout is preferred; the
//! `dependencies` layout is only read when `packages` yields no entries.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{ManifestFormat, ManifestParser};
use crate::model::{DeclarationKind, InstalledPackage};

const NODE_MODULES_PREFIX: &str = "node_modules/";
const UNKNOWN_VERSION: &str = "unknown";

pub struct PackageLockParser;

impl ManifestParser for PackageLockParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PackageLock
    }

    fn parse(&self, content: &str) -> Vec<InstalledPackage> {
        let lock_file: Map<String, Value> = match serde_json::from_str(content) {
            Ok(lock_file) => lock_file,
            Err(e) => {
                tracing::debug!(error = %e, "package-lock.json is not a JSON object");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut packages = Vec::new();

        if let Some(entries) = lock_file.get("packages").and_then(Value::as_object) {
            for (key, entry) in entries {
                // The root project ("") and workspace links have no prefix.
                let Some(name) = install_path_name(key) else {
                    continue;
                };
                if seen.insert(name.to_string()) {
                    packages.push(InstalledPackage::new(
                        name,
                        entry_version(entry),
                        DeclarationKind::NpmLock,
                    ));
                }
            }
        }

        if packages.is_empty() {
            if let Some(entries) = lock_file.get("dependencies").and_then(Value::as_object) {
                for (name, entry) in entries {
                    if seen.insert(name.clone()) {
                        packages.push(InstalledPackage::new(
                            name,
                            entry_version(entry),
                            DeclarationKind::NpmLock,
                        ));
                    }
                }
            }
        }

        packages
    }
}

/// Extracts the package name from an install path key.
///
/// `node_modules/a/node_modules/@scope/b` yields `@scope/b`.
fn install_path_name(key: &str) -> Option<&str> {
    if !key.starts_with(NODE_MODULES_PREFIX) {
        return None;
    }
    let pos = key.rfind(NODE_MODULES_PREFIX)?;
    let name = &key[pos + NODE_MODULES_PREFIX.len()..];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn entry_version(entry: &Value) -> String {
    entry
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_VERSION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK_V3: &str = r#"{
  "name": "my-app",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "my-app", "version": "1.0.0" },
    "packages/workspace-a": { "name": "workspace-a", "version": "0.1.0" },
    "node_modules/lodash": { "version": "4.17.21" },
    "node_modules/@ctrl/tinycolor": { "version": "4.1.1" },
    "node_modules/express/node_modules/debug": { "version": "2.6.9" },
    "node_modules/no-version": {}
  }
}"#;

    const LOCK_V2_BOTH_LAYOUTS: &str = r#"{
  "lockfileVersion": 2,
  "packages": {
    "": { "name": "my-app" },
    "node_modules/evil-pkg": { "version": "1.0.0" }
  },
  "dependencies": {
    "evil-pkg": { "version": "1.0.0" },
    "legacy-only": { "version": "9.9.9" }
  }
}"#;

    const LOCK_V1: &str = r#"{
  "lockfileVersion": 1,
  "dependencies": {
    "badlib": { "version": "2.0.0" },
    "no-version": { "dev": true }
  }
}"#;

    #[test]
    fn test_parse_packages_layout() {
        let packages = PackageLockParser.parse(LOCK_V3);
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(
            names,
            ["lodash", "@ctrl/tinycolor", "debug", "no-version"]
        );
        assert_eq!(packages[1].version, "4.1.1");
        assert_eq!(packages[2].version, "2.6.9");
        assert_eq!(packages[3].version, "unknown");
        assert!(packages
            .iter()
            .all(|p| p.declaration == DeclarationKind::NpmLock));
    }

    #[test]
    fn test_packages_layout_wins_over_dependencies() {
        let packages = PackageLockParser.parse(LOCK_V2_BOTH_LAYOUTS);

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "evil-pkg");
        assert!(!packages.iter().any(|p| p.name == "legacy-only"));
    }

    #[test]
    fn test_legacy_dependencies_layout() {
        let packages = PackageLockParser.parse(LOCK_V1);

        assert_eq!(
            packages,
            vec![
                InstalledPackage::new("badlib", "2.0.0", DeclarationKind::NpmLock),
                InstalledPackage::new("no-version", "unknown", DeclarationKind::NpmLock),
            ]
        );
    }

    #[test]
    fn test_root_only_packages_falls_back_to_dependencies() {
        let packages = PackageLockParser.parse(
            r#"{"packages": {"": {"name": "app"}}, "dependencies": {"badlib": {"version": "2.0.0"}}}"#,
        );

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "badlib");
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let packages = PackageLockParser.parse(
            r#"{"packages": {
                "node_modules/debug": {"version": "4.3.4"},
                "node_modules/express/node_modules/debug": {"version": "2.6.9"}
            }}"#,
        );

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].version, "4.3.4");
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(PackageLockParser.parse("{").is_empty());
        assert!(PackageLockParser.parse("\"string\"").is_empty());
    }

    #[test]
    fn test_install_path_name() {
        assert_eq!(install_path_name("node_modules/lodash"), Some("lodash"));
        assert_eq!(install_path_name("node_modules/@scope/pkg"), Some("@scope/pkg"));
        assert_eq!(install_path_name("node_modules/a/node_modules/b"), Some("b"));
        assert_eq!(install_path_name(""), None);
        assert_eq!(install_path_name("packages/app"), None);
        assert_eq!(install_path_name("node_modules/"), None);
    }
}
