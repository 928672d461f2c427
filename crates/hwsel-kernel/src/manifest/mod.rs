//! Engine manifests.
//!
//! Each engine lives in its own directory with a single [`MANIFEST_FILENAME`]
//! document. Decoding is strict: unknown fields, malformed sizes, illegal
//! device fields and non-primitive configuration values are all rejected
//! before a manifest ever reaches the scorer.

mod device;
mod load;
mod validate;

pub use device::{
    Bus, CpuAmd64Requirement, CpuArchitecture, CpuArm64Requirement, DeviceRequirement,
    DeviceSchemaError, DeviceType, Field, PciCriteria, PciGenericRequirement,
    PciGpuRequirement, PciIds, RawDevice, UsbRequirement, legal_fields,
};
pub use load::{load_manifest, load_manifests};
pub use validate::{parse_manifest, validate};

use crate::units::ByteSize;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// File name of the manifest inside each engine directory.
pub const MANIFEST_FILENAME: &str = "engine.yaml";

/// Declarative description of one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    /// Always set once [`EngineManifest::validate`] has passed.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_grade"
    )]
    pub grade: Option<Grade>,

    #[serde(default)]
    pub devices: Devices,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<ByteSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_space: Option<ByteSize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "primitive_configurations"
    )]
    pub configurations: BTreeMap<String, ConfigValue>,
}

impl EngineManifest {
    pub fn is_stable(&self) -> bool {
        self.grade == Some(Grade::Stable)
    }
}

/// Conjunctive and disjunctive device groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Devices {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allof: Vec<DeviceRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anyof: Vec<DeviceRequirement>,
}

impl Devices {
    pub fn is_empty(&self) -> bool {
        self.allof.is_empty() && self.anyof.is_empty()
    }
}

/// `stable` engines may be selected automatically; `devel` engines are
/// listed but never auto-selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Grade {
    Stable,
    Devel,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Stable => "stable",
            Grade::Devel => "devel",
        }
    }
}

impl TryFrom<String> for Grade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "stable" => Ok(Grade::Stable),
            "devel" => Ok(Grade::Devel),
            _ => Err("grade should be 'stable' or 'devel'".to_string()),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration override. Only scalars are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{v}"),
            ConfigValue::Integer(v) => write!(f, "{v}"),
            ConfigValue::Float(v) => write!(f, "{v}"),
            ConfigValue::String(v) => f.write_str(v),
        }
    }
}

impl ConfigValue {
    fn from_yaml(value: serde_yaml::Value) -> Option<Self> {
        match value {
            serde_yaml::Value::Bool(b) => Some(ConfigValue::Bool(b)),
            serde_yaml::Value::Number(n) => n
                .as_i64()
                .map(ConfigValue::Integer)
                .or_else(|| n.as_f64().map(ConfigValue::Float)),
            serde_yaml::Value::String(s) => Some(ConfigValue::String(s)),
            _ => None,
        }
    }
}

/// An empty `grade:` counts as unset, like the other required fields.
fn optional_grade<'de, D>(deserializer: D) -> Result<Option<Grade>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => Grade::try_from(value).map(Some).map_err(de::Error::custom),
    }
}

fn primitive_configurations<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ConfigValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_yaml::Value>>::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| match ConfigValue::from_yaml(value) {
            Some(value) => Ok((key, value)),
            None => Err(de::Error::custom(format!(
                "configuration field {key} is not a primitive value"
            ))),
        })
        .collect()
}
