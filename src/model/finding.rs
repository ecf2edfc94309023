use serde::{Deserialize, Serialize};

/// How the registry entry behind a finding was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Fetched from the configured URL during this run.
    Remote,
    /// Taken from the local cache or the embedded fallback list.
    Cached,
    /// Supplied by the operator through `additional_packages`.
    Additional,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Remote => "remote",
            Provenance::Cached => "cached",
            Provenance::Additional => "additional",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A package confirmed to be on the compromised list.
///
/// `version` is `None` when the registry entry is name-only, meaning every
/// version of the package is compromised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompromisedFinding {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "source")]
    pub provenance: Provenance,
}

impl CompromisedFinding {
    pub fn new(name: impl Into<String>, version: Option<String>, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            version,
            provenance,
        }
    }

    /// `name@version`, or just `name` for name-only findings.
    pub fn display_id(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}
