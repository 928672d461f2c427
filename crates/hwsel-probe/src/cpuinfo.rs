//! `/proc/cpuinfo` parsing.
//!
//! The kernel prints one block per logical processor. Identical blocks are
//! collapsed, so a homogeneous 16-thread machine yields a single
//! [`CpuDescriptor`] while a big.LITTLE board yields one per core type.

use crate::error::{ProbeError, ProbeResult};
use hwsel_kernel::{Architecture, CpuDescriptor, HexId};
use std::collections::BTreeSet;

/// Parse cpuinfo text for a host whose `uname -m` is `machine`.
pub fn parse_cpuinfo(cpuinfo: &str, machine: &str) -> ProbeResult<Vec<CpuDescriptor>> {
    let architecture = Architecture::from_machine(machine);
    let mut cpus: Vec<CpuDescriptor> = Vec::new();

    for block in cpuinfo.split("\n\n") {
        let fields: Vec<(&str, &str)> = block
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();
        if !fields.iter().any(|(key, _)| *key == "processor") {
            continue;
        }

        let cpu = descriptor(&architecture, &fields)?;
        if !cpus.contains(&cpu) {
            cpus.push(cpu);
        }
    }
    Ok(cpus)
}

fn descriptor(architecture: &Architecture, fields: &[(&str, &str)]) -> ProbeResult<CpuDescriptor> {
    let get = |name: &str| {
        fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    };
    let words = |value: Option<&str>| -> BTreeSet<String> {
        value
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    };
    let hex = |name: &'static str| -> ProbeResult<Option<HexId>> {
        get(name)
            .map(|value| {
                value.parse().map_err(|_| ProbeError::Parse {
                    what: name,
                    input: value.to_string(),
                })
            })
            .transpose()
    };

    let mut cpu = CpuDescriptor {
        architecture: architecture.clone(),
        manufacturer_id: None,
        flags: BTreeSet::new(),
        implementer_id: None,
        part_number: None,
        features: BTreeSet::new(),
    };
    match architecture {
        Architecture::Amd64 => {
            cpu.manufacturer_id = get("vendor_id").map(str::to_string);
            cpu.flags = words(get("flags"));
        }
        Architecture::Arm64 => {
            cpu.implementer_id = hex("CPU implementer")?;
            cpu.part_number = hex("CPU part")?;
            cpu.features = words(get("Features"));
        }
        Architecture::Other(_) => {}
    }
    Ok(cpu)
}
