use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

/// Package type assumed for keys written in the legacy `type:name` form,
/// which predates multi-package-type support.
pub const DEFAULT_PACKAGE_TYPE: &str = "maven";

/// Kind of store a [`StoreKey`] addresses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    /// Locally deployed content
    Hosted,
    /// Proxy of an upstream repository
    Remote,
    /// Virtual store merging an ordered list of constituents
    Group,
}

impl StoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Hosted => "hosted",
            StoreType::Remote => "remote",
            StoreType::Group => "group",
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreType {
    type Err = StoreKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hosted" => Ok(StoreType::Hosted),
            "remote" => Ok(StoreType::Remote),
            "group" => Ok(StoreType::Group),
            other => Err(StoreKeyParseError::UnknownStoreType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreKeyParseError {
    #[error("Unknown store type: {0}")]
    UnknownStoreType(String),
    #[error("Malformed store key: {0}")]
    Malformed(String),
}

/// Identity of a store: `(package_type, store_type, name)`.
///
/// Keys order and compare by all three fields and render canonically as
/// `package:type:name` (e.g. `maven:remote:central`). Parsing also accepts
/// the legacy two-field `type:name` form, defaulting the package type to
/// [`DEFAULT_PACKAGE_TYPE`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey {
    pub package_type: SmolStr,
    pub store_type: StoreType,
    pub name: SmolStr,
}

impl StoreKey {
    pub fn new(
        package_type: impl Into<SmolStr>,
        store_type: StoreType,
        name: impl Into<SmolStr>,
    ) -> Self {
        Self {
            package_type: package_type.into(),
            store_type,
            name: name.into(),
        }
    }

    pub fn hosted(package_type: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self::new(package_type, StoreType::Hosted, name)
    }

    pub fn remote(package_type: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self::new(package_type, StoreType::Remote, name)
    }

    pub fn group(package_type: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self::new(package_type, StoreType::Group, name)
    }

    pub fn is_group(&self) -> bool {
        self.store_type == StoreType::Group
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.package_type, self.store_type, self.name)
    }
}

impl FromStr for StoreKey {
    type Err = StoreKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(3, ':').collect();
        let (package_type, store_type, name) = match parts.as_slice() {
            [st, name] => (DEFAULT_PACKAGE_TYPE, *st, *name),
            [pkg, st, name] => (*pkg, *st, *name),
            _ => return Err(StoreKeyParseError::Malformed(s.to_string())),
        };
        if package_type.is_empty() || name.is_empty() {
            return Err(StoreKeyParseError::Malformed(s.to_string()));
        }
        Ok(StoreKey::new(package_type, store_type.parse()?, name))
    }
}

impl Serialize for StoreKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StoreKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for StoreKey {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "StoreKey".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        String::json_schema(generator)
    }
}
