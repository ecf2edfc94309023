use super::Registry;

/// Last-resort list used when neither the remote list nor a fresh cache is
/// available. Every entry is name-only.
pub const EMBEDDED_PACKAGES: &[&str] = &[
    "cr0wdstrike-fix",
    "crowdstrike-update",
    "crowdstrike-emergency-fix",
    "crowdstrike-fix-update",
    "crowdstrik-update",
    "croudstrike-fix",
    "crowdstrike-falcon-fix",
    "crowdstrikefix",
];

pub fn embedded_registry() -> Registry {
    let mut registry = Registry::new();
    for name in EMBEDDED_PACKAGES {
        registry.insert_name(*name);
    }
    registry
}
