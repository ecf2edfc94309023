use super::Registry;

impl Registry {
    /// Parses the compromised package list text format.
    ///
    /// The format is line oriented:
    ///
    /// - blank lines and lines starting with `#` are ignored
    /// - `name:version` adds one compromised version for `name` (split at
    ///   the first colon)
    /// - a bare `name` marks every version of `name` as compromised
    ///
    /// Lines for the same name accumulate into one version list.
    ///
    /// # Example
    ///
    /// ```
    /// use pkgscan::registry::Registry;
    ///
    /// let registry = Registry::parse("# list\nevil-pkg:1.0.0\nevil-pkg:1.0.1\nbadlib\n");
    /// assert_eq!(registry.versions("evil-pkg").unwrap(), ["1.0.0", "1.0.1"]);
    /// assert!(registry.versions("badlib").unwrap().is_empty());
    /// ```
    pub fn parse(content: &str) -> Self {
        let mut registry = Registry::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once(':') {
                Some((name, version)) => {
                    let name = name.trim();
                    let version = version.trim();
                    if name.is_empty() {
                        tracing::debug!(line, "skipping registry line without a package name");
                        continue;
                    }
                    if version.is_empty() {
                        // A dangling colon is not a name-only entry.
                        tracing::debug!(line, "skipping registry line with an empty version");
                        continue;
                    }
                    registry.insert_version(name, version);
                }
                None => registry.insert_name(line),
            }
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions_and_names() {
        let registry = Registry::parse("evil-pkg:1.0.0\nbadlib\n");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.versions("evil-pkg").unwrap(), ["1.0.0"]);
        assert!(registry.versions("badlib").unwrap().is_empty());
        assert!(registry.versions("lodash").is_none());
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# header\n\n   \n  # indented comment\nbadlib\r\n";
        let registry = Registry::parse(text);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("badlib"));
    }

    #[test]
    fn test_parse_accumulates_versions() {
        let text = "@ctrl/tinycolor:4.1.1\n@ctrl/tinycolor:4.1.2\n@ctrl/tinycolor:4.1.1\n";
        let registry = Registry::parse(text);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.versions("@ctrl/tinycolor").unwrap(),
            ["4.1.1", "4.1.2"]
        );
    }

    #[test]
    fn test_parse_splits_at_first_colon() {
        let registry = Registry::parse("weird:1.0.0:extra\n");
        assert_eq!(registry.versions("weird").unwrap(), ["1.0.0:extra"]);
    }

    #[test]
    fn test_parse_version_after_bare_name_narrows_entry() {
        let registry = Registry::parse("badlib\nbadlib:2.0.0\n");
        assert_eq!(registry.versions("badlib").unwrap(), ["2.0.0"]);
    }

    #[test]
    fn test_parse_malformed_lines() {
        let registry = Registry::parse(":1.0.0\nbadlib:\nbadlib:   \nevil-pkg:1.0.0\n");

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("badlib"));
        assert!(registry.contains("evil-pkg"));
    }

    #[test]
    fn test_parse_empty_version_keeps_existing_versions() {
        let registry = Registry::parse("evil-pkg:1.0.0\nevil-pkg:\n");
        assert_eq!(registry.versions("evil-pkg").unwrap(), ["1.0.0"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "b:1\na\nb:2\nc:3\n";
        assert_eq!(Registry::parse(text), Registry::parse(text));
    }
}
