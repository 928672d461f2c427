//! Device requirements.
//!
//! A requirement is decoded from the flat document form ([`RawDevice`]) and
//! then narrowed into one [`DeviceRequirement`] variant per `(type, bus)`
//! pair. Which fields may be set for a pair is a static table
//! ([`legal_fields`]); anything outside it is rejected while the manifest is
//! decoded, so matchers never see an illegal combination.

use crate::units::{ByteSize, ComputeCapability, HexId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Cpu,
    Gpu,
    Npu,
    Tpu,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Cpu => "cpu",
            DeviceType::Gpu => "gpu",
            DeviceType::Npu => "npu",
            DeviceType::Tpu => "tpu",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bus {
    Pci,
    Usb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuArchitecture {
    Amd64,
    Arm64,
}

/// Every optional field a device requirement can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Architecture,
    ManufacturerId,
    Flags,
    ImplementerId,
    PartNumber,
    Features,
    VendorId,
    DeviceId,
    Vram,
    ComputeCapability,
    SnapConnections,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Architecture => "architecture",
            Field::ManufacturerId => "manufacturer-id",
            Field::Flags => "flags",
            Field::ImplementerId => "implementer-id",
            Field::PartNumber => "part-number",
            Field::Features => "features",
            Field::VendorId => "vendor-id",
            Field::DeviceId => "device-id",
            Field::Vram => "vram",
            Field::ComputeCapability => "compute-capability",
            Field::SnapConnections => "snap-connections",
        }
    }
}

const CPU_AMD64: &[Field] = &[Field::Architecture, Field::ManufacturerId, Field::Flags];
const CPU_ARM64: &[Field] = &[
    Field::Architecture,
    Field::ImplementerId,
    Field::PartNumber,
    Field::Features,
];
const PCI_GPU: &[Field] = &[
    Field::VendorId,
    Field::DeviceId,
    Field::SnapConnections,
    Field::Vram,
    Field::ComputeCapability,
];
const PCI_GENERIC: &[Field] = &[Field::VendorId, Field::DeviceId, Field::SnapConnections];
const USB: &[Field] = &[Field::VendorId, Field::DeviceId];

/// Legal field set for a `(type, bus)` pair. CPUs are further split by
/// architecture.
pub fn legal_fields(
    device_type: Option<DeviceType>,
    bus: Option<Bus>,
    architecture: Option<CpuArchitecture>,
) -> Result<&'static [Field], DeviceSchemaError> {
    match (device_type, bus) {
        (Some(DeviceType::Cpu), Some(_)) => Err(DeviceSchemaError::CpuBus),
        (Some(DeviceType::Cpu), None) => match architecture {
            Some(CpuArchitecture::Amd64) => Ok(CPU_AMD64),
            Some(CpuArchitecture::Arm64) => Ok(CPU_ARM64),
            None => Err(DeviceSchemaError::MissingArchitecture),
        },
        (_, Some(Bus::Usb)) => Ok(USB),
        (Some(DeviceType::Gpu), _) => Ok(PCI_GPU),
        (Some(DeviceType::Npu | DeviceType::Tpu) | None, _) => Ok(PCI_GENERIC),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeviceSchemaError {
    #[error("cpu: architecture field required")]
    MissingArchitecture,

    #[error("cpu: bus must not be set")]
    CpuBus,

    #[error("{context}: invalid field: {field}")]
    IllegalField {
        context: &'static str,
        field: &'static str,
    },
}

// ============================================================================
// Document form
// ============================================================================

/// Flat document form of a device requirement, as written in `engine.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawDevice {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<Bus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<CpuArchitecture>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementer_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<HexId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<HexId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<HexId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram: Option<ByteSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_capability: Option<ComputeCapability>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snap_connections: Vec<String>,
}

impl RawDevice {
    /// Fields carrying a value. Empty lists count as unset.
    fn set_fields(&self) -> Vec<Field> {
        let candidates = [
            (Field::Architecture, self.architecture.is_some()),
            (Field::ManufacturerId, self.manufacturer_id.is_some()),
            (Field::Flags, !self.flags.is_empty()),
            (Field::ImplementerId, self.implementer_id.is_some()),
            (Field::PartNumber, self.part_number.is_some()),
            (Field::Features, !self.features.is_empty()),
            (Field::VendorId, self.vendor_id.is_some()),
            (Field::DeviceId, self.device_id.is_some()),
            (Field::Vram, self.vram.is_some()),
            (Field::ComputeCapability, self.compute_capability.is_some()),
            (Field::SnapConnections, !self.snap_connections.is_empty()),
        ];
        candidates
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }

    fn context(&self) -> &'static str {
        match (self.device_type, self.bus, self.architecture) {
            (Some(DeviceType::Cpu), _, Some(CpuArchitecture::Amd64)) => "cpu amd64",
            (Some(DeviceType::Cpu), _, _) => "cpu arm64",
            (Some(DeviceType::Gpu), Some(Bus::Usb), _) => "gpu usb device",
            (Some(DeviceType::Gpu), _, _) => "gpu pci device",
            (Some(DeviceType::Npu), Some(Bus::Usb), _) => "npu usb device",
            (Some(DeviceType::Npu), _, _) => "npu pci device",
            (Some(DeviceType::Tpu), Some(Bus::Usb), _) => "tpu usb device",
            (Some(DeviceType::Tpu), _, _) => "tpu pci device",
            (None, Some(Bus::Usb), _) => "typeless usb device",
            (None, _, _) => "typeless pci device",
        }
    }
}

// ============================================================================
// Typed requirements
// ============================================================================

/// One device a manifest requires, narrowed to its `(type, bus)` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDevice", into = "RawDevice")]
pub enum DeviceRequirement {
    CpuAmd64(CpuAmd64Requirement),
    CpuArm64(CpuArm64Requirement),
    PciGpu(PciGpuRequirement),
    Pci(PciGenericRequirement),
    Usb(UsbRequirement),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuAmd64Requirement {
    pub manufacturer_id: Option<String>,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuArm64Requirement {
    pub implementer_id: Option<HexId>,
    pub part_number: Option<HexId>,
    pub features: Vec<String>,
}

/// Vendor/device filter and driver gates shared by all PCI requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PciIds {
    pub vendor_id: Option<HexId>,
    pub device_id: Option<HexId>,
    pub snap_connections: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PciGpuRequirement {
    pub ids: PciIds,
    pub vram: Option<ByteSize>,
    pub compute_capability: Option<ComputeCapability>,
}

/// A PCI requirement with type `npu`, `tpu` or no type at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PciGenericRequirement {
    pub device_type: Option<DeviceType>,
    pub ids: PciIds,
}

/// Accepted by the schema; matching is not implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsbRequirement {
    pub device_type: Option<DeviceType>,
    pub vendor_id: Option<HexId>,
    pub device_id: Option<HexId>,
}

/// Borrowed view of what the PCI matcher needs from any PCI variant.
#[derive(Debug, Clone, Copy)]
pub struct PciCriteria<'a> {
    pub device_type: Option<DeviceType>,
    pub ids: &'a PciIds,
    pub vram: Option<ByteSize>,
    pub compute_capability: Option<ComputeCapability>,
}

impl DeviceRequirement {
    pub fn device_type(&self) -> Option<DeviceType> {
        match self {
            DeviceRequirement::CpuAmd64(_) | DeviceRequirement::CpuArm64(_) => {
                Some(DeviceType::Cpu)
            }
            DeviceRequirement::PciGpu(_) => Some(DeviceType::Gpu),
            DeviceRequirement::Pci(req) => req.device_type,
            DeviceRequirement::Usb(req) => req.device_type,
        }
    }

    pub fn pci_criteria(&self) -> Option<PciCriteria<'_>> {
        match self {
            DeviceRequirement::PciGpu(req) => Some(PciCriteria {
                device_type: Some(DeviceType::Gpu),
                ids: &req.ids,
                vram: req.vram,
                compute_capability: req.compute_capability,
            }),
            DeviceRequirement::Pci(req) => Some(PciCriteria {
                device_type: req.device_type,
                ids: &req.ids,
                vram: None,
                compute_capability: None,
            }),
            _ => None,
        }
    }
}

impl TryFrom<RawDevice> for DeviceRequirement {
    type Error = DeviceSchemaError;

    fn try_from(raw: RawDevice) -> Result<Self, Self::Error> {
        let legal = legal_fields(raw.device_type, raw.bus, raw.architecture)?;
        if let Some(field) = raw.set_fields().into_iter().find(|f| !legal.contains(f)) {
            return Err(DeviceSchemaError::IllegalField {
                context: raw.context(),
                field: field.name(),
            });
        }

        let ids = PciIds {
            vendor_id: raw.vendor_id,
            device_id: raw.device_id,
            snap_connections: raw.snap_connections,
        };

        let requirement = match (raw.device_type, raw.bus, raw.architecture) {
            (Some(DeviceType::Cpu), _, Some(CpuArchitecture::Amd64)) => {
                DeviceRequirement::CpuAmd64(CpuAmd64Requirement {
                    manufacturer_id: raw.manufacturer_id,
                    flags: raw.flags,
                })
            }
            (Some(DeviceType::Cpu), _, _) => DeviceRequirement::CpuArm64(CpuArm64Requirement {
                implementer_id: raw.implementer_id,
                part_number: raw.part_number,
                features: raw.features,
            }),
            (device_type, Some(Bus::Usb), _) => DeviceRequirement::Usb(UsbRequirement {
                device_type,
                vendor_id: ids.vendor_id,
                device_id: ids.device_id,
            }),
            (Some(DeviceType::Gpu), _, _) => DeviceRequirement::PciGpu(PciGpuRequirement {
                ids,
                vram: raw.vram,
                compute_capability: raw.compute_capability,
            }),
            (device_type, _, _) => {
                DeviceRequirement::Pci(PciGenericRequirement { device_type, ids })
            }
        };
        Ok(requirement)
    }
}

impl From<DeviceRequirement> for RawDevice {
    fn from(requirement: DeviceRequirement) -> Self {
        match requirement {
            DeviceRequirement::CpuAmd64(req) => RawDevice {
                device_type: Some(DeviceType::Cpu),
                architecture: Some(CpuArchitecture::Amd64),
                manufacturer_id: req.manufacturer_id,
                flags: req.flags,
                ..RawDevice::default()
            },
            DeviceRequirement::CpuArm64(req) => RawDevice {
                device_type: Some(DeviceType::Cpu),
                architecture: Some(CpuArchitecture::Arm64),
                implementer_id: req.implementer_id,
                part_number: req.part_number,
                features: req.features,
                ..RawDevice::default()
            },
            DeviceRequirement::PciGpu(req) => RawDevice {
                device_type: Some(DeviceType::Gpu),
                vendor_id: req.ids.vendor_id,
                device_id: req.ids.device_id,
                snap_connections: req.ids.snap_connections,
                vram: req.vram,
                compute_capability: req.compute_capability,
                ..RawDevice::default()
            },
            DeviceRequirement::Pci(req) => RawDevice {
                device_type: req.device_type,
                vendor_id: req.ids.vendor_id,
                device_id: req.ids.device_id,
                snap_connections: req.ids.snap_connections,
                ..RawDevice::default()
            },
            DeviceRequirement::Usb(req) => RawDevice {
                device_type: req.device_type,
                bus: Some(Bus::Usb),
                vendor_id: req.vendor_id,
                device_id: req.device_id,
                ..RawDevice::default()
            },
        }
    }
}
