use std::collections::BTreeSet;

use super::{embedded_registry, HttpFetcher, Registry, RegistryFetcher};
use crate::cache::RegistryCache;
use crate::model::Provenance;

/// Which tier supplied the base list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryTier {
    Remote,
    Cache,
    Embedded,
}

impl RegistryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryTier::Remote => "remote",
            RegistryTier::Cache => "cache",
            RegistryTier::Embedded => "embedded",
        }
    }
}

/// The registry snapshot for one run, with where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedRegistry {
    pub registry: Registry,
    pub tier: RegistryTier,
    additional: BTreeSet<String>,
}

impl ResolvedRegistry {
    pub fn new(registry: Registry, tier: RegistryTier) -> Self {
        Self {
            registry,
            tier,
            additional: BTreeSet::new(),
        }
    }

    /// Merges operator-supplied names as name-only entries.
    ///
    /// Names already present keep their version list, but are still reported
    /// as [`Provenance::Additional`].
    pub fn with_additional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            self.registry.insert_name(name);
            self.additional.insert(name.to_string());
        }
        self
    }

    pub fn used_fallback(&self) -> bool {
        self.tier != RegistryTier::Remote
    }

    pub fn is_additional(&self, name: &str) -> bool {
        self.additional.contains(name)
    }

    /// Provenance reported for a finding on `name`.
    pub fn provenance_of(&self, name: &str) -> Provenance {
        if self.is_additional(name) {
            Provenance::Additional
        } else if self.used_fallback() {
            Provenance::Cached
        } else {
            Provenance::Remote
        }
    }
}

/// Resolves the compromised package list through remote, cache, and
/// embedded tiers.
///
/// # Example
///
/// ```no_run
/// use pkgscan::cache::RegistryCache;
/// use pkgscan::registry::RegistryResolver;
///
/// #[tokio::main]
/// async fn main() {
///     let resolver = RegistryResolver::http(RegistryCache::with_timeout_minutes(60));
///     let resolved = resolver
///         .resolve("https://example.com/compromised-packages.txt", &[])
///         .await;
///     println!("{} packages from {}", resolved.registry.len(), resolved.tier.as_str());
/// }
/// ```
pub struct RegistryResolver {
    fetcher: Box<dyn RegistryFetcher>,
    cache: RegistryCache,
}

impl RegistryResolver {
    pub fn new(fetcher: impl RegistryFetcher + 'static, cache: RegistryCache) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            cache,
        }
    }

    pub fn http(cache: RegistryCache) -> Self {
        Self::new(HttpFetcher::new(), cache)
    }

    pub fn cache(&self) -> &RegistryCache {
        &self.cache
    }

    /// Resolves the registry. Never fails: the embedded list is the floor.
    pub async fn resolve(&self, url: &str, additional: &[String]) -> ResolvedRegistry {
        let resolved = match self.fetch_remote(url).await {
            Some(registry) => ResolvedRegistry::new(registry, RegistryTier::Remote),
            None => self.fallback(),
        };

        let resolved = resolved.with_additional(additional);
        if !additional.is_empty() {
            tracing::info!(
                count = additional.len(),
                "added additional packages from config"
            );
        }
        resolved
    }

    async fn fetch_remote(&self, url: &str) -> Option<Registry> {
        tracing::info!(url, fetcher = self.fetcher.name(), "fetching compromised package list");

        let content = match self.fetcher.fetch(url).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to fetch compromised package list");
                return None;
            }
        };

        let registry = Registry::parse(&content);

        if let Err(e) = self.cache.write(&content) {
            tracing::warn!(path = %self.cache.path().display(), error = %e, "could not write registry cache");
        }

        tracing::info!(packages = registry.len(), "fetched compromised package list");
        Some(registry)
    }

    fn fallback(&self) -> ResolvedRegistry {
        if let Some(content) = self.cache.read() {
            let registry = Registry::parse(&content);
            tracing::warn!(packages = registry.len(), "using cached compromised package list");
            return ResolvedRegistry::new(registry, RegistryTier::Cache);
        }

        let registry = embedded_registry();
        tracing::warn!(
            packages = registry.len(),
            "no valid cache available, using embedded fallback list"
        );
        ResolvedRegistry::new(registry, RegistryTier::Embedded)
    }
}
