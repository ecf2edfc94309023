//! Detects known-compromised npm packages in a project's manifests and
//! lockfiles.
//!
//! The compromised list is taken from a remote URL, falling back to a local
//! cache and then to a built-in list. Every `package.json`,
//! `package-lock.json`, `yarn.lock` and `pnpm-lock.yaml` under the scan root
//! is parsed and matched against it by exact name and version.

pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod output;
pub mod parser;
pub mod registry;
pub mod scanner;

pub use cache::RegistryCache;
pub use config::Config;
pub use error::{ConfigError, ScanError};
pub use model::{CompromisedFinding, InstalledPackage, Provenance, ScanResult, ScanSummary};
pub use registry::{Registry, RegistryResolver, ResolvedRegistry};
pub use scanner::{ScanEngine, ScanOptions};
