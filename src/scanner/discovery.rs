//! Dependency file discovery.
//!
//! Walks the scan root for the four supported file names, pruning any
//! directory whose name is in the exclusion list. Exclusion is by path
//! segment: excluding `node_modules` skips every `node_modules` directory at
//! any depth, but the scan root itself is never excluded.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::ScanError;
use crate::parser::ManifestFormat;

/// A dependency file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: ManifestFormat,
}

/// Checks that `root` exists and is a directory.
pub fn validate_root(root: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::RootNotDirectory(root.to_path_buf())),
        Err(_) => Err(ScanError::RootNotFound(root.to_path_buf())),
    }
}

/// Finds every supported dependency file under `root`.
///
/// Results are grouped by format in [`ManifestFormat::ALL`] order and sorted
/// by path within each format. A failure to read the root is fatal; an
/// unreadable subdirectory is skipped with a warning.
pub fn discover_files(root: &Path, exclude: &[String]) -> Result<Vec<DiscoveredFile>, ScanError> {
    validate_root(root)?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, exclude));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(format) = ManifestFormat::from_path(entry.path()) {
            files.push(DiscoveredFile {
                path: entry.into_path(),
                format,
            });
        }
    }

    files.sort_by(|a, b| {
        format_rank(a.format)
            .cmp(&format_rank(b.format))
            .then_with(|| a.path.cmp(&b.path))
    });

    tracing::debug!(root = %root.display(), files = files.len(), "discovered dependency files");
    Ok(files)
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.iter().any(|ex| ex == name))
}

fn format_rank(format: ManifestFormat) -> usize {
    ManifestFormat::ALL
        .iter()
        .position(|f| *f == format)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    fn relative(root: &Path, files: &[DiscoveredFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_discovers_all_formats_in_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pnpm-lock.yaml");
        touch(dir.path(), "yarn.lock");
        touch(dir.path(), "package-lock.json");
        touch(dir.path(), "package.json");
        touch(dir.path(), "apps/web/package.json");
        touch(dir.path(), "README.md");

        let files = discover_files(dir.path(), &[]).unwrap();

        assert_eq!(
            relative(dir.path(), &files),
            [
                "apps/web/package.json",
                "package.json",
                "package-lock.json",
                "yarn.lock",
                "pnpm-lock.yaml",
            ]
        );
        assert_eq!(files[0].format, ManifestFormat::PackageJson);
        assert_eq!(files[4].format, ManifestFormat::PnpmLock);
    }

    #[test]
    fn test_excluded_directories_are_pruned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "package.json");
        touch(dir.path(), "node_modules/evil-pkg/package.json");
        touch(dir.path(), "packages/a/node_modules/b/package.json");
        touch(dir.path(), "dist/package.json");
        touch(dir.path(), "my_node_modules/package.json");

        let exclude = vec!["node_modules".to_string(), "dist".to_string()];
        let files = discover_files(dir.path(), &exclude).unwrap();

        assert_eq!(
            relative(dir.path(), &files),
            ["my_node_modules/package.json", "package.json"]
        );
    }

    #[test]
    fn test_root_named_like_excluded_dir_is_scanned() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("node_modules");
        touch(&root, "package.json");

        let files = discover_files(&root, &["node_modules".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let err = discover_files(&missing, &[]).unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "package.json");

        let err = discover_files(&dir.path().join("package.json"), &[]).unwrap_err();
        assert!(matches!(err, ScanError::RootNotDirectory(_)));
    }
}
