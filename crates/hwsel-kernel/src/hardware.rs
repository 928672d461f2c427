//! Hardware snapshot model.
//!
//! A [`HardwareSnapshot`] is captured once per run (or decoded from a document
//! for offline testing) and is read-only afterwards. Field names follow the
//! snapshot document format: `cpus`, `memory`, `disk`, `pci`.

use crate::units::HexId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Detected hardware of one machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareSnapshot {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpus: Vec<CpuDescriptor>,

    #[serde(default)]
    pub memory: MemoryInfo,

    /// Storage statistics keyed by a well-known path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub disk: BTreeMap<String, DirStats>,

    #[serde(default, rename = "pci")]
    pub pci_devices: Vec<PciDescriptor>,
}

/// CPU instruction set architecture, using Debian-style names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Architecture {
    Amd64,
    Arm64,
    Other(String),
}

impl Architecture {
    /// Map a Rust/kernel machine name (`x86_64`, `aarch64`) to an architecture.
    pub fn from_machine(machine: &str) -> Self {
        match machine.trim() {
            "x86_64" | "amd64" => Architecture::Amd64,
            "aarch64" | "arm64" => Architecture::Arm64,
            other => Architecture::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
            Architecture::Other(name) => name,
        }
    }
}

impl From<String> for Architecture {
    fn from(value: String) -> Self {
        match value.as_str() {
            "amd64" => Architecture::Amd64,
            "arm64" => Architecture::Arm64,
            _ => Architecture::Other(value),
        }
    }
}

impl From<Architecture> for String {
    fn from(value: Architecture) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One distinct CPU model on the host.
///
/// amd64 hosts fill `manufacturer_id` and `flags`; arm64 hosts fill
/// `implementer_id`, `part_number` and `features`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CpuDescriptor {
    pub architecture: Architecture,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementer_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<HexId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub features: BTreeSet<String>,
}

impl CpuDescriptor {
    pub fn amd64(manufacturer_id: impl Into<String>, flags: &[&str]) -> Self {
        Self {
            architecture: Architecture::Amd64,
            manufacturer_id: Some(manufacturer_id.into()),
            flags: flags.iter().map(|f| f.to_string()).collect(),
            implementer_id: None,
            part_number: None,
            features: BTreeSet::new(),
        }
    }

    pub fn arm64(implementer_id: u32, part_number: u32, features: &[&str]) -> Self {
        Self {
            architecture: Architecture::Arm64,
            manufacturer_id: None,
            flags: BTreeSet::new(),
            implementer_id: Some(HexId(implementer_id)),
            part_number: Some(HexId(part_number)),
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Total memory in bytes. A `total_ram` of zero means "not measured".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemoryInfo {
    #[serde(default)]
    pub total_ram: u64,
    #[serde(default)]
    pub total_swap: u64,
}

/// Size and free space of the filesystem holding a directory, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub avail: u64,
}

/// A device on the PCI bus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PciDescriptor {
    /// Bus address, e.g. `0000:01:00.0`.
    pub slot: String,
    pub bus_number: HexId,
    /// Base class and sub class, e.g. `0x0300` for a VGA controller.
    pub device_class: HexId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programming_interface: Option<u8>,
    pub vendor_id: HexId,
    pub device_id: HexId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subvendor_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdevice_id: Option<HexId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subvendor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdevice_name: Option<String>,

    /// Vendor-tool supplied properties such as `vram` and `compute-capability`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_properties: BTreeMap<String, String>,
}

impl PciDescriptor {
    pub fn new(slot: impl Into<String>, bus_number: u32, device_class: u32, vendor_id: u32, device_id: u32) -> Self {
        Self {
            slot: slot.into(),
            bus_number: HexId(bus_number),
            device_class: HexId(device_class),
            vendor_id: HexId(vendor_id),
            device_id: HexId(device_id),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_properties.insert(key.into(), value.into());
        self
    }
}
