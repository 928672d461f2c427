//! PCI enumeration from sysfs (`/sys/bus/pci/devices`).

use crate::error::{ProbeError, ProbeResult};
use hwsel_kernel::{HexId, PciDescriptor};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Read every device under a sysfs `devices` directory, ordered by slot.
///
/// A device whose attribute files cannot be read or parsed is skipped with a
/// warning; a missing directory means "no PCI bus" and yields an empty list.
pub fn read_pci_devices(devices_dir: &Path) -> ProbeResult<Vec<PciDescriptor>> {
    let entries = match fs::read_dir(devices_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(ProbeError::io(devices_dir)(err)),
    };

    let mut devices = Vec::new();
    for entry in entries {
        let entry = entry.map_err(ProbeError::io(devices_dir))?;
        let slot = entry.file_name().to_string_lossy().into_owned();
        match read_device(&entry.path(), &slot) {
            Ok(device) => devices.push(device),
            Err(err) => warn!(slot = %slot, error = %err, "skipping unreadable pci device"),
        }
    }
    devices.sort_by(|a, b| a.slot.cmp(&b.slot));
    Ok(devices)
}

fn read_device(dir: &Path, slot: &str) -> ProbeResult<PciDescriptor> {
    let attribute = |name: &str| -> ProbeResult<String> {
        let path = dir.join(name);
        fs::read_to_string(&path)
            .map(|value| value.trim().to_string())
            .map_err(ProbeError::io(path))
    };
    let optional = |name: &str| attribute(name).ok().and_then(|v| v.parse::<HexId>().ok());

    let class = parse_hex("class", &attribute("class")?)?;
    Ok(PciDescriptor {
        slot: slot.to_string(),
        bus_number: bus_number(slot)?,
        device_class: HexId(class >> 8),
        programming_interface: Some((class & 0xff) as u8),
        vendor_id: HexId(parse_hex("vendor", &attribute("vendor")?)?),
        device_id: HexId(parse_hex("device", &attribute("device")?)?),
        subvendor_id: optional("subsystem_vendor"),
        subdevice_id: optional("subsystem_device"),
        ..PciDescriptor::default()
    })
}

/// Bus number from a `domain:bus:device.function` slot.
pub fn bus_number(slot: &str) -> ProbeResult<HexId> {
    let mut parts = slot.split(':');
    let bus = match (parts.next(), parts.next(), parts.next()) {
        (Some(_domain), Some(bus), Some(_)) => bus,
        (Some(bus), Some(_), None) => bus,
        _ => {
            return Err(ProbeError::Parse {
                what: "pci slot",
                input: slot.to_string(),
            });
        }
    };
    Ok(HexId(parse_hex("pci slot", bus)?))
}

fn parse_hex(what: &'static str, value: &str) -> ProbeResult<u32> {
    value
        .parse::<HexId>()
        .map(HexId::get)
        .map_err(|_| ProbeError::Parse {
            what,
            input: value.to_string(),
        })
}
