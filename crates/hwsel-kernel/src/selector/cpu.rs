//! CPU requirement matching.
//!
//! Every host CPU is checked independently and the best one wins: several
//! CPU descriptors are alternative hosts for the requirement, not pooled
//! capacity.

use super::{DeviceMatch, weights};
use crate::hardware::{Architecture, CpuDescriptor};
use crate::manifest::{CpuAmd64Requirement, CpuArm64Requirement};

pub fn match_amd64(requirement: &CpuAmd64Requirement, cpus: &[CpuDescriptor]) -> DeviceMatch {
    best_cpu(cpus, |cpu| check_amd64(requirement, cpu))
}

pub fn match_arm64(requirement: &CpuArm64Requirement, cpus: &[CpuDescriptor]) -> DeviceMatch {
    best_cpu(cpus, |cpu| check_arm64(requirement, cpu))
}

/// Max score over host CPUs. Issues are only reported when no CPU passes;
/// they carry a `cpu <i>: ` prefix when the host has more than one CPU.
fn best_cpu<F>(cpus: &[CpuDescriptor], check: F) -> DeviceMatch
where
    F: Fn(&CpuDescriptor) -> (u32, Vec<String>),
{
    if cpus.is_empty() {
        return DeviceMatch::failed(vec!["no cpu found on host system".to_string()]);
    }

    let mut best = 0;
    let mut issues = Vec::new();
    for (i, cpu) in cpus.iter().enumerate() {
        let (score, cpu_issues) = check(cpu);
        best = best.max(score);
        if cpus.len() > 1 {
            issues.extend(cpu_issues.into_iter().map(|issue| format!("cpu {i}: {issue}")));
        } else {
            issues.extend(cpu_issues);
        }
    }

    if best > 0 {
        DeviceMatch::passed(best)
    } else {
        DeviceMatch::failed(issues)
    }
}

fn check_amd64(requirement: &CpuAmd64Requirement, cpu: &CpuDescriptor) -> (u32, Vec<String>) {
    if cpu.architecture != Architecture::Amd64 {
        return (0, vec![format!("architecture not {}", Architecture::Amd64)]);
    }

    let mut score = weights::CPU_DEVICE;
    let mut issues = Vec::new();

    if let Some(required) = &requirement.manufacturer_id {
        let found = cpu.manufacturer_id.as_deref().unwrap_or_default();
        if found == required {
            score += weights::CPU_VENDOR;
        } else {
            issues.push(format!("manufacturer id mismatch: {found}"));
        }
    }

    for flag in &requirement.flags {
        if cpu.flags.contains(flag) {
            score += weights::CPU_FLAG;
        } else {
            issues.push(format!("flag {flag} missing"));
        }
    }

    if issues.is_empty() { (score, issues) } else { (0, issues) }
}

fn check_arm64(requirement: &CpuArm64Requirement, cpu: &CpuDescriptor) -> (u32, Vec<String>) {
    if cpu.architecture != Architecture::Arm64 {
        return (0, vec![format!("architecture not {}", Architecture::Arm64)]);
    }

    let mut score = weights::CPU_DEVICE;
    let mut issues = Vec::new();

    if let Some(required) = requirement.implementer_id {
        let found = cpu.implementer_id.unwrap_or_default();
        if found == required {
            score += weights::CPU_VENDOR;
        } else {
            issues.push(format!("implementer id mismatch: {found:x}"));
        }
    }

    if let Some(required) = requirement.part_number {
        let found = cpu.part_number.unwrap_or_default();
        if found == required {
            score += weights::CPU_MODEL;
        } else {
            issues.push(format!("part number mismatch: {found:x}"));
        }
    }

    for feature in &requirement.features {
        if cpu.features.contains(feature) {
            score += weights::CPU_FLAG;
        } else {
            issues.push(format!("feature not found: {feature}"));
        }
    }

    if issues.is_empty() { (score, issues) } else { (0, issues) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::HexId;

    fn amd64_req(manufacturer: Option<&str>, flags: &[&str]) -> CpuAmd64Requirement {
        CpuAmd64Requirement {
            manufacturer_id: manufacturer.map(str::to_string),
            flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn manufacturer_and_flags_add_up() {
        let cpus = [CpuDescriptor::amd64("GenuineIntel", &["avx", "avx2"])];

        let base = match_amd64(&amd64_req(Some("GenuineIntel"), &[]), &cpus);
        assert_eq!(base.score, weights::CPU_DEVICE + weights::CPU_VENDOR);
        assert!(base.issues.is_empty());

        let flags = match_amd64(&amd64_req(Some("GenuineIntel"), &["avx", "avx2"]), &cpus);
        assert_eq!(base.score + 2 * weights::CPU_FLAG, flags.score);
    }

    #[test]
    fn every_missing_flag_is_reported() {
        let cpus = [CpuDescriptor::amd64("AuthenticAMD", &["avx"])];
        let result = match_amd64(
            &amd64_req(Some("GenuineIntel"), &["avx", "avx2", "avx512f"]),
            &cpus,
        );
        assert_eq!(result.score, 0);
        assert_eq!(
            result.issues,
            vec![
                "manufacturer id mismatch: AuthenticAMD",
                "flag avx2 missing",
                "flag avx512f missing",
            ]
        );
    }

    #[test]
    fn architecture_mismatch_stops_checks() {
        let cpus = [CpuDescriptor::arm64(0x41, 0xd0b, &["asimd"])];
        let result = match_amd64(&amd64_req(Some("GenuineIntel"), &["avx2"]), &cpus);
        assert_eq!(result.score, 0);
        assert_eq!(result.issues, vec!["architecture not amd64"]);
    }

    #[test]
    fn no_cpus() {
        let result = match_amd64(&amd64_req(None, &[]), &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.issues, vec!["no cpu found on host system"]);
    }

    #[test]
    fn best_of_several_cpus_wins() {
        let cpus = [
            CpuDescriptor::amd64("GenuineIntel", &["avx"]),
            CpuDescriptor::amd64("GenuineIntel", &["avx", "avx2"]),
        ];
        let result = match_amd64(&amd64_req(None, &["avx2"]), &cpus);
        assert_eq!(result.score, weights::CPU_DEVICE + weights::CPU_FLAG);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn issues_are_prefixed_with_cpu_index() {
        let cpus = [
            CpuDescriptor::amd64("GenuineIntel", &[]),
            CpuDescriptor::amd64("GenuineIntel", &["sse"]),
        ];
        let result = match_amd64(&amd64_req(None, &["avx2"]), &cpus);
        assert_eq!(
            result.issues,
            vec!["cpu 0: flag avx2 missing", "cpu 1: flag avx2 missing"]
        );
    }

    #[test]
    fn arm64_ids_and_features() {
        let cpus = [CpuDescriptor::arm64(0x41, 0xd0b, &["asimd", "fp"])];
        let req = CpuArm64Requirement {
            implementer_id: Some(HexId(0x41)),
            part_number: Some(HexId(0xD0B)),
            features: vec!["asimd".into()],
        };
        let result = match_arm64(&req, &cpus);
        assert_eq!(
            result.score,
            weights::CPU_DEVICE + weights::CPU_VENDOR + weights::CPU_MODEL + weights::CPU_FLAG
        );

        let wrong = CpuArm64Requirement {
            implementer_id: Some(HexId(0xc0)),
            part_number: Some(HexId(0xac3)),
            features: vec!["sve".into()],
        };
        let result = match_arm64(&wrong, &cpus);
        assert_eq!(result.score, 0);
        assert_eq!(
            result.issues,
            vec![
                "implementer id mismatch: 41",
                "part number mismatch: d0b",
                "feature not found: sve",
            ]
        );
    }
}
