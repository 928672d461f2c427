//! NVIDIA GPU properties through `nvidia-smi`.

use crate::error::{ProbeError, ProbeResult};
use hwsel_kernel::selector::pci::{COMPUTE_CAPABILITY_PROPERTY, VRAM_PROPERTY};
use std::collections::BTreeMap;
use std::process::Command;

pub const NVIDIA_VENDOR_ID: u32 = 0x10de;

/// Query vRAM and compute capability of the GPU in `slot`.
pub fn gpu_properties(slot: &str) -> ProbeResult<BTreeMap<String, String>> {
    let output = Command::new("nvidia-smi")
        .arg(format!("--id={slot}"))
        .args(["--query-gpu=memory.total,compute_cap", "--format=csv,noheader"])
        .env("LANG", "C")
        .output()
        .map_err(|err| ProbeError::Command {
            program: "nvidia-smi".to_string(),
            message: err.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        // nvidia-smi reports its errors on stdout
        return Err(ProbeError::Command {
            program: "nvidia-smi".to_string(),
            message: format!("{}: {}", output.status, stdout.trim()),
        });
    }
    parse_query_output(&stdout)
}

/// Parse one `memory.total, compute_cap` CSV line such as `24564 MiB, 8.9`.
pub fn parse_query_output(output: &str) -> ProbeResult<BTreeMap<String, String>> {
    let line = output.lines().next().unwrap_or_default().trim();
    let (memory, capability) = line.split_once(',').ok_or_else(|| ProbeError::Parse {
        what: "nvidia-smi output",
        input: line.to_string(),
    })?;

    let mut properties = BTreeMap::new();
    properties.insert(VRAM_PROPERTY.to_string(), parse_memory(memory.trim())?.to_string());
    let capability = capability.trim();
    if !capability.is_empty() && capability != "[N/A]" {
        properties.insert(COMPUTE_CAPABILITY_PROPERTY.to_string(), capability.to_string());
    }
    Ok(properties)
}

fn parse_memory(value: &str) -> ProbeResult<u64> {
    let invalid = || ProbeError::Parse {
        what: "nvidia-smi memory",
        input: value.to_string(),
    };
    let (number, unit) = value.split_once(' ').unwrap_or((value, ""));
    let scale: u64 = match unit {
        "" | "B" => 1,
        "KiB" => 1 << 10,
        "MiB" => 1 << 20,
        "GiB" => 1 << 30,
        _ => return Err(invalid()),
    };
    number
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_memory_and_capability() {
        let props = parse_query_output("24564 MiB, 8.9\n").unwrap();
        assert_eq!(props[VRAM_PROPERTY], "25757220864");
        assert_eq!(props[COMPUTE_CAPABILITY_PROPERTY], "8.9");
    }

    #[test]
    fn missing_capability_is_left_out() {
        let props = parse_query_output("4096 MiB, [N/A]").unwrap();
        assert_eq!(props[VRAM_PROPERTY], "4294967296");
        assert!(!props.contains_key(COMPUTE_CAPABILITY_PROPERTY));
    }

    #[test]
    fn rejects_unexpected_output() {
        assert!(parse_query_output("No devices were found").is_err());
        assert!(parse_query_output("lots MiB, 8.9").is_err());
        assert!(parse_query_output("12 PiB, 8.9").is_err());
    }
}
