//! The consumed provider-catalog interface.
//!
//! The host application supplies the catalog as a static JSON list; the
//! engine only uses it to annotate tasks with the parameter names their
//! provider type accepts, and to surface non-blocking missing-provider
//! findings. A provider type absent from the catalog is never a fatal
//! condition.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::workflow::TaskKind;

/// One provider entry as supplied by the host application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub can_query: bool,
    #[serde(default)]
    pub can_notify: bool,
    #[serde(default)]
    pub query_params: Vec<String>,
    #[serde(default)]
    pub notify_params: Vec<String>,
}

/// The set of installed providers, indexed by type.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    providers: AHashMap<String, ProviderInfo>,
}

impl ProviderCatalog {
    pub fn new(providers: Vec<ProviderInfo>) -> Self {
        ProviderCatalog {
            providers: providers
                .into_iter()
                .map(|p| (p.provider_type.clone(), p))
                .collect(),
        }
    }

    /// Decodes the catalog from the JSON list the host supplies.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let providers: Vec<ProviderInfo> = serde_json::from_str(text)?;
        Ok(Self::new(providers))
    }

    pub fn contains(&self, provider_type: &str) -> bool {
        self.providers.contains_key(provider_type)
    }

    pub fn get(&self, provider_type: &str) -> Option<&ProviderInfo> {
        self.providers.get(provider_type)
    }

    /// The parameter names available to a task of the given kind: query
    /// parameters for steps, notify parameters for actions.
    pub fn parameters_for(&self, provider_type: &str, kind: TaskKind) -> Option<&[String]> {
        let info = self.providers.get(provider_type)?;
        let params = match kind {
            TaskKind::Step => &info.query_params,
            TaskKind::Action => &info.notify_params,
        };
        Some(params.as_slice())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
