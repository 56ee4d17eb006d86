use super::key::{StoreKey, StoreType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

/// A configured repository definition.
///
/// The shared fields live here; everything variant-specific sits behind
/// [`StoreSpec`]. The `key.store_type` discriminant and the spec variant
/// always agree for values built through the constructors; the engine
/// re-checks the pairing before committing anything handed in externally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ArtifactStore {
    pub key: StoreKey,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form annotations (audit info, origin tags, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(flatten)]
    pub spec: StoreSpec,
}

/// Variant-specific configuration, closed over the three store types.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreSpec {
    Remote(RemoteSpec),
    Hosted(HostedSpec),
    Group(GroupSpec),
}

impl StoreSpec {
    pub fn store_type(&self) -> StoreType {
        match self {
            StoreSpec::Remote(_) => StoreType::Remote,
            StoreSpec::Hosted(_) => StoreType::Hosted,
            StoreSpec::Group(_) => StoreType::Group,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct RemoteSpec {
    #[schemars(with = "String")]
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct HostedSpec {
    #[serde(default)]
    pub allow_releases: bool,
    #[serde(default)]
    pub allow_snapshots: bool,
    /// Readonly hosted repositories refuse deletion and deployment.
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct GroupSpec {
    /// Ordered membership; order defines search/merge precedence.
    /// Entries may reference keys that do not (yet) exist in the registry.
    #[serde(default)]
    pub constituents: Vec<StoreKey>,
    #[serde(default)]
    pub prepend_constituent: bool,
}

impl ArtifactStore {
    pub fn new(key: StoreKey, spec: StoreSpec) -> Self {
        Self {
            key,
            disabled: false,
            description: None,
            metadata: BTreeMap::new(),
            spec,
        }
    }

    pub fn remote(package_type: impl Into<SmolStr>, name: impl Into<SmolStr>, url: Url) -> Self {
        Self::new(
            StoreKey::remote(package_type, name),
            StoreSpec::Remote(RemoteSpec {
                url,
                user: None,
                password: None,
                timeout_seconds: None,
            }),
        )
    }

    pub fn hosted(package_type: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self::new(
            StoreKey::hosted(package_type, name),
            StoreSpec::Hosted(HostedSpec::default()),
        )
    }

    pub fn group(
        package_type: impl Into<SmolStr>,
        name: impl Into<SmolStr>,
        constituents: Vec<StoreKey>,
    ) -> Self {
        Self::new(
            StoreKey::group(package_type, name),
            StoreSpec::Group(GroupSpec {
                constituents,
                prepend_constituent: false,
            }),
        )
    }

    pub fn key(&self) -> &StoreKey {
        &self.key
    }

    pub fn package_type(&self) -> &str {
        &self.key.package_type
    }

    pub fn store_type(&self) -> StoreType {
        self.key.store_type
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn is_group(&self) -> bool {
        matches!(self.spec, StoreSpec::Group(_))
    }

    /// Group membership in declared order; empty for non-groups.
    pub fn constituents(&self) -> &[StoreKey] {
        match &self.spec {
            StoreSpec::Group(g) => &g.constituents,
            _ => &[],
        }
    }

    /// True for hosted repositories flagged readonly.
    pub fn is_readonly(&self) -> bool {
        matches!(&self.spec, StoreSpec::Hosted(h) if h.readonly)
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
