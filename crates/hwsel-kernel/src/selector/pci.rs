//! PCI requirement matching.
//!
//! Host devices are first narrowed by vendor and device id without producing
//! any diagnostics; an `N requirements x M devices` grid of "id mismatch"
//! lines says nothing that "device not found" doesn't. The remaining devices
//! are scored one by one and the best one wins.

use super::{ConnectionGate, DeviceMatch, weights};
use crate::hardware::PciDescriptor;
use crate::manifest::{DeviceType, PciCriteria, PciIds};
use crate::units::{ByteSize, ComputeCapability};
use tracing::debug;

pub const VRAM_PROPERTY: &str = "vram";
pub const COMPUTE_CAPABILITY_PROPERTY: &str = "compute-capability";

pub fn match_pci(
    criteria: PciCriteria<'_>,
    devices: &[PciDescriptor],
    gate: &dyn ConnectionGate,
) -> DeviceMatch {
    if devices.is_empty() {
        return DeviceMatch::failed(vec!["no pci devices on host system".to_string()]);
    }

    let candidates = filter_devices(devices, criteria.ids);
    if candidates.is_empty() {
        return DeviceMatch::failed(vec!["device not found".to_string()]);
    }

    let mut best = 0;
    let mut issues = Vec::new();
    for device in candidates {
        match score_device(&criteria, device, gate) {
            Ok(0) => issues.push(format!("pci {}: matched device scored 0", device.slot)),
            Ok(score) => {
                debug!(slot = %device.slot, score, "pci device matched");
                best = best.max(score);
            }
            Err(issue) => issues.push(format!("pci {}: {issue}", device.slot)),
        }
    }

    if best > 0 {
        DeviceMatch::passed(best)
    } else {
        DeviceMatch::failed(issues)
    }
}

/// Devices whose ids agree with the requirement. An unset id matches
/// anything; ids compare numerically so case never matters.
pub fn filter_devices<'d>(devices: &'d [PciDescriptor], ids: &PciIds) -> Vec<&'d PciDescriptor> {
    devices
        .iter()
        .filter(|device| ids.vendor_id.is_none_or(|vendor| vendor == device.vendor_id))
        .filter(|device| ids.device_id.is_none_or(|id| id == device.device_id))
        .collect()
}

fn score_device(
    criteria: &PciCriteria<'_>,
    device: &PciDescriptor,
    gate: &dyn ConnectionGate,
) -> Result<u32, String> {
    let mut score = 0;

    if let Some(device_type) = criteria.device_type {
        if !class_matches(device_type, device.device_class.get()) {
            return Err(format!(
                "device class {} not of required type {device_type}",
                device.device_class
            ));
        }
        score += weights::PCI_DEVICE_TYPE;
    }

    // Bus 0 is integrated; anything else is treated as discrete.
    if device.bus_number.get() > 0 {
        score += weights::PCI_DEVICE_EXTERNAL;
    }

    if let Some(required) = criteria.vram {
        check_vram(required, device)?;
        score += weights::GPU_VRAM;
    }

    if let Some(required) = criteria.compute_capability {
        check_compute_capability(required, device)?;
        score += weights::GPU_COMPUTE_CAPABILITY;
    }

    for connection in &criteria.ids.snap_connections {
        match gate.is_connected(connection) {
            Ok(true) => {}
            Ok(false) => return Err(format!("{connection:?} is not connected")),
            Err(err) => {
                return Err(format!("error checking connection {connection:?}: {err}"));
            }
        }
    }

    Ok(score)
}

/// Map a required device type onto PCI class codes.
///
/// - gpu: legacy VGA (`0x0001`) or any display controller (`0x03xx`)
/// - npu/tpu: processing accelerator (`0x12xx`) or co-processor (`0x0b40`)
pub fn class_matches(device_type: DeviceType, class: u32) -> bool {
    match device_type {
        DeviceType::Gpu => class == 0x0001 || class & 0xff00 == 0x0300,
        DeviceType::Npu | DeviceType::Tpu => class & 0xff00 == 0x1200 || class == 0x0b40,
        DeviceType::Cpu => false,
    }
}

fn check_vram(required: ByteSize, device: &PciDescriptor) -> Result<(), String> {
    let Some(raw) = device.additional_properties.get(VRAM_PROPERTY) else {
        return Err("unable to detect vRAM".to_string());
    };
    let available: ByteSize = raw
        .parse()
        .map_err(|err| format!("error parsing vRAM: {err}"))?;
    if available >= required {
        Ok(())
    } else {
        Err(format!("not enough vRAM: {}", available.bytes()))
    }
}

fn check_compute_capability(
    required: ComputeCapability,
    device: &PciDescriptor,
) -> Result<(), String> {
    let Some(raw) = device.additional_properties.get(COMPUTE_CAPABILITY_PROPERTY) else {
        return Err("unable to detect compute capability".to_string());
    };
    let available: ComputeCapability = raw
        .parse()
        .map_err(|err| format!("error parsing compute capability: {err}"))?;
    if available >= required {
        Ok(())
    } else {
        Err(format!("compute capability too low: {available}"))
    }
}
