//! Core data types for installed packages, findings, and scan results.
//!
//! This module contains the fundamental types used throughout pkgscan:
//!
//! - [`InstalledPackage`] - A dependency declared in a manifest or lockfile
//! - [`DeclarationKind`] - Where in the file the dependency was declared
//! - [`PackageManager`] - The package manager a file belongs to
//! - [`CompromisedFinding`] - A package confirmed to be on the compromised list
//! - [`Provenance`] - How the compromised list entry was obtained
//! - [`ScanResult`] - Results for one manifest or lockfile
//! - [`ScanSummary`] - Project-wide results
//!
//! # Example
//!
//! ```
//! use pkgscan::model::{DeclarationKind, InstalledPackage};
//!
//! let package = InstalledPackage::new("lodash", "4.17.21", DeclarationKind::NpmLock);
//! assert_eq!(package.declaration.as_str(), "package-lock.json");
//! ```

mod finding;
mod package;
mod summary;

pub use finding::*;
pub use package::*;
pub use summary::*;
