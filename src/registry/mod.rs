//! The compromised package registry.
//!
//! A [`Registry`] maps package names to the versions known to be
//! compromised. An empty version list means every version of that name is
//! compromised.
//!
//! The list is acquired by [`RegistryResolver`] from one of three tiers, in
//! strict priority order:
//!
//! | Tier | Source | `used_fallback` |
//! |------|--------|-----------------|
//! | [`RegistryTier::Remote`] | HTTP GET of the configured URL | `false` |
//! | [`RegistryTier::Cache`] | [`RegistryCache`](crate::cache::RegistryCache) file | `true` |
//! | [`RegistryTier::Embedded`] | list compiled into the binary | `true` |
//!
//! All three tiers share the same line-oriented text grammar, see
//! [`Registry::parse`].

mod embedded;
mod fetcher;
mod parse;
mod resolver;

pub use embedded::{embedded_registry, EMBEDDED_PACKAGES};
pub use fetcher::{HttpFetcher, RegistryFetcher};
pub use resolver::{RegistryResolver, ResolvedRegistry, RegistryTier};

use std::collections::BTreeMap;

/// A snapshot of compromised package names and versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, Vec<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `version` to the compromised versions of `name`.
    ///
    /// Versions accumulate per name; a repeated version is ignored.
    pub fn insert_version(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let versions = self.entries.entry(name.into()).or_default();
        let version = version.into();
        if !versions.contains(&version) {
            versions.push(version);
        }
    }

    /// Adds `name` as a name-only entry unless it is already present.
    pub fn insert_name(&mut self, name: impl Into<String>) {
        self.entries.entry(name.into()).or_default();
    }

    /// Returns the compromised versions for `name`, if it is listed.
    pub fn versions(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, versions)| (name.as_str(), versions.as_slice()))
    }
}
