use serde_json::{Map, Value};

use super::{ManifestFormat, ManifestParser};
use crate::model::{DeclarationKind, InstalledPackage};

/// Parses the four dependency groups of a `package.json` manifest.
pub struct PackageJsonParser;

const GROUPS: [(&str, DeclarationKind); 4] = [
    ("dependencies", DeclarationKind::Runtime),
    ("devDependencies", DeclarationKind::Dev),
    ("peerDependencies", DeclarationKind::Peer),
    ("optionalDependencies", DeclarationKind::Optional),
];

impl ManifestParser for PackageJsonParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::PackageJson
    }

    fn parse(&self, content: &str) -> Vec<InstalledPackage> {
        let manifest: Map<String, Value> = match serde_json::from_str(content) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::debug!(error = %e, "package.json is not a JSON object");
                return Vec::new();
            }
        };

        let mut packages = Vec::new();

        for (key, kind) in GROUPS {
            let Some(group) = manifest.get(key).and_then(Value::as_object) else {
                continue;
            };

            for (name, range) in group {
                // Non-string specifiers are kept in their JSON form.
                let version = match range {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                packages.push(InstalledPackage::new(name, version, kind));
            }
        }

        packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PACKAGE_JSON: &str = r#"{
  "name": "my-app",
  "version": "1.0.0",
  "dependencies": {
    "evil-pkg": "1.0.0",
    "lodash": "^4.17.21"
  },
  "devDependencies": {
    "badlib": "2.0.0"
  },
  "peerDependencies": {
    "react": ">=17"
  },
  "optionalDependencies": {
    "fsevents": "~2.3.2"
  }
}"#;

    #[test]
    fn test_parse_all_groups() {
        let packages = PackageJsonParser.parse(SAMPLE_PACKAGE_JSON);

        assert_eq!(packages.len(), 5);
        assert_eq!(
            packages[0],
            InstalledPackage::new("evil-pkg", "1.0.0", DeclarationKind::Runtime)
        );
        assert_eq!(
            packages[1],
            InstalledPackage::new("lodash", "^4.17.21", DeclarationKind::Runtime)
        );
        assert_eq!(packages[2].declaration, DeclarationKind::Dev);
        assert_eq!(packages[3].declaration, DeclarationKind::Peer);
        assert_eq!(packages[4].name, "fsevents");
        assert_eq!(packages[4].declaration, DeclarationKind::Optional);
    }

    #[test]
    fn test_parse_without_dependencies() {
        let packages = PackageJsonParser.parse(r#"{"name": "empty", "scripts": {}}"#);
        assert!(packages.is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(PackageJsonParser.parse("{ not json").is_empty());
        assert!(PackageJsonParser.parse("[1, 2, 3]").is_empty());
        assert!(PackageJsonParser.parse("").is_empty());
    }

    #[test]
    fn test_parse_ignores_malformed_group() {
        let packages = PackageJsonParser.parse(
            r#"{"dependencies": ["lodash"], "devDependencies": {"badlib": "2.0.0"}}"#,
        );

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "badlib");
    }
}
