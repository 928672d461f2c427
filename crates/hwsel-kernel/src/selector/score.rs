use super::{ConnectionGate, DeviceMatch, ScoredManifest, cpu, pci, weights};
use crate::error::ScoreError;
use crate::hardware::HardwareSnapshot;
use crate::manifest::{DeviceRequirement, EngineManifest};
use tracing::debug;

/// Disk statistics key checked against a manifest's `disk-space`.
pub const DEFAULT_STORAGE_PATH: &str = "/var/lib/snapd/snaps";

const USB_NOT_IMPLEMENTED: &str = "usb device matching not implemented";

/// Scores manifests against one hardware snapshot.
///
/// The scorer only borrows its inputs; the same snapshot gives the same
/// result for the same manifest every time.
pub struct EngineScorer<'a> {
    snapshot: &'a HardwareSnapshot,
    gate: &'a dyn ConnectionGate,
    storage_path: String,
}

/// Running total and issue list for one manifest.
#[derive(Default)]
struct Tally {
    score: u32,
    compatible: bool,
    issues: Vec<String>,
}

impl Tally {
    fn fail(&mut self, issue: impl Into<String>) {
        self.compatible = false;
        self.issues.push(issue.into());
    }
}

impl<'a> EngineScorer<'a> {
    pub fn new(snapshot: &'a HardwareSnapshot, gate: &'a dyn ConnectionGate) -> Self {
        Self {
            snapshot,
            gate,
            storage_path: DEFAULT_STORAGE_PATH.to_string(),
        }
    }

    pub fn with_storage_path(mut self, storage_path: impl Into<String>) -> Self {
        self.storage_path = storage_path.into();
        self
    }

    /// Score every manifest, preserving input order.
    ///
    /// A measurement missing for any one manifest aborts the whole batch.
    pub fn score_all(&self, manifests: &[EngineManifest]) -> Result<Vec<ScoredManifest>, ScoreError> {
        manifests.iter().map(|m| self.score(m)).collect()
    }

    pub fn score(&self, manifest: &EngineManifest) -> Result<ScoredManifest, ScoreError> {
        let mut tally = Tally {
            compatible: true,
            ..Tally::default()
        };

        self.check_memory(manifest, &mut tally)?;
        self.check_disk(manifest, &mut tally)?;
        self.check_allof(&manifest.devices.allof, &mut tally);
        self.check_anyof(&manifest.devices.anyof, &mut tally);

        let score = if tally.compatible { tally.score } else { 0 };
        debug!(
            engine = %manifest.name,
            score,
            issues = tally.issues.len(),
            "scored engine"
        );
        Ok(ScoredManifest::new(manifest.clone(), score, tally.issues))
    }

    /// RAM and swap together count as usable memory. Zero RAM means the
    /// host never reported it.
    fn check_memory(&self, manifest: &EngineManifest, tally: &mut Tally) -> Result<(), ScoreError> {
        let Some(required) = manifest.memory else {
            return Ok(());
        };
        let memory = &self.snapshot.memory;
        if memory.total_ram == 0 {
            return Err(ScoreError::MeasurementMissing {
                engine: manifest.name.clone(),
                reason: "total memory not reported by host system".to_string(),
            });
        }
        if memory.total_ram.saturating_add(memory.total_swap) < required.bytes() {
            tally.fail("host system memory too small");
        } else {
            tally.score += weights::RESOURCE;
        }
        Ok(())
    }

    fn check_disk(&self, manifest: &EngineManifest, tally: &mut Tally) -> Result<(), ScoreError> {
        let Some(required) = manifest.disk_space else {
            return Ok(());
        };
        let Some(stats) = self.snapshot.disk.get(&self.storage_path) else {
            return Err(ScoreError::MeasurementMissing {
                engine: manifest.name.clone(),
                reason: "disk space not reported by host system".to_string(),
            });
        };
        if stats.avail < required.bytes() {
            tally.fail("host system disk space too small");
        } else {
            tally.score += weights::RESOURCE;
        }
        Ok(())
    }

    /// Every requirement must match; any miss zeroes the whole group.
    fn check_allof(&self, devices: &[DeviceRequirement], tally: &mut Tally) {
        if devices.is_empty() {
            return;
        }

        let mut group_score = 0;
        let mut group_ok = true;
        for device in devices {
            let result = self.match_device(device);
            if result.is_match() {
                group_score += result.score;
                continue;
            }
            group_ok = false;
            match device {
                DeviceRequirement::Usb(_) => tally.fail(USB_NOT_IMPLEMENTED),
                DeviceRequirement::CpuAmd64(_) | DeviceRequirement::CpuArm64(_) => {
                    tally.fail("required cpu device not found");
                    tally.issues.extend(result.issues);
                }
                DeviceRequirement::PciGpu(_) | DeviceRequirement::Pci(_) => {
                    tally.fail("required pci device not found");
                    tally.issues.extend(result.issues);
                }
            }
        }

        if group_ok {
            tally.score += group_score;
        }
    }

    /// At least one requirement must match; all matching ones are summed.
    fn check_anyof(&self, devices: &[DeviceRequirement], tally: &mut Tally) {
        if devices.is_empty() {
            return;
        }

        let mut group_score = 0;
        let mut found = 0;
        let mut details = Vec::new();
        for device in devices {
            let result = self.match_device(device);
            if result.is_match() {
                found += 1;
                group_score += result.score;
            } else if matches!(device, DeviceRequirement::Usb(_)) {
                // Surfaced even when another requirement satisfies the group.
                tally.issues.push(USB_NOT_IMPLEMENTED.to_string());
            } else {
                details.extend(result.issues);
            }
        }

        if found == 0 {
            tally.fail("required device not found");
            tally.issues.extend(details);
        } else {
            tally.score += group_score;
        }
    }

    fn match_device(&self, device: &DeviceRequirement) -> DeviceMatch {
        match device {
            DeviceRequirement::CpuAmd64(req) => cpu::match_amd64(req, &self.snapshot.cpus),
            DeviceRequirement::CpuArm64(req) => cpu::match_arm64(req, &self.snapshot.cpus),
            DeviceRequirement::PciGpu(_) | DeviceRequirement::Pci(_) => match device.pci_criteria() {
                Some(criteria) => pci::match_pci(criteria, &self.snapshot.pci_devices, self.gate),
                None => DeviceMatch::failed(vec!["required device not found".to_string()]),
            },
            DeviceRequirement::Usb(_) => DeviceMatch::failed(vec![USB_NOT_IMPLEMENTED.to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{CpuDescriptor, DirStats, MemoryInfo, PciDescriptor};
    use crate::manifest::parse_manifest;
    use crate::selector::{AllConnected, top_engine};

    fn manifest(body: &str) -> EngineManifest {
        let doc = format!("name: test\ndescription: test\nvendor: test\ngrade: stable\n{body}");
        parse_manifest(None, &doc).unwrap()
    }

    fn intel_host() -> HardwareSnapshot {
        HardwareSnapshot {
            cpus: vec![CpuDescriptor::amd64("GenuineIntel", &["avx", "avx2"])],
            memory: MemoryInfo {
                total_ram: 16_000_000_000,
                total_swap: 0,
            },
            disk: [(
                DEFAULT_STORAGE_PATH.to_string(),
                DirStats {
                    total: 500_000_000_000,
                    avail: 100_000_000_000,
                },
            )]
            .into(),
            pci_devices: vec![
                PciDescriptor::new("0000:00:02.0", 0, 0x0300, 0x8086, 0x9a49),
            ],
        }
    }

    fn score(snapshot: &HardwareSnapshot, manifest: &EngineManifest) -> ScoredManifest {
        EngineScorer::new(snapshot, &AllConnected).score(manifest).unwrap()
    }

    #[test]
    fn memory_counts_swap() {
        let m = manifest("memory: 300M\n");
        let mut host = intel_host();

        host.memory = MemoryInfo {
            total_ram: 200_000_000,
            total_swap: 200_000_000,
        };
        let passing = score(&host, &m);
        assert!(passing.is_compatible());
        assert_eq!(passing.score(), weights::RESOURCE);

        host.memory = MemoryInfo {
            total_ram: 100_000_000,
            total_swap: 200_000_000,
        };
        let failing = score(&host, &m);
        assert_eq!(failing.score(), 0);
        assert!(!failing.is_compatible());
        assert_eq!(failing.issues(), ["host system memory too small"]);
    }

    #[test]
    fn disk_uses_storage_path_key() {
        let m = manifest("disk-space: 300M\n");
        let host = intel_host();
        assert_eq!(score(&host, &m).score(), weights::RESOURCE);

        let err = EngineScorer::new(&host, &AllConnected)
            .with_storage_path("/srv")
            .score(&m)
            .unwrap_err();
        assert_eq!(
            err,
            ScoreError::MeasurementMissing {
                engine: "test".into(),
                reason: "disk space not reported by host system".into(),
            }
        );
    }

    #[test]
    fn small_disk_is_incompatible() {
        let m = manifest("disk-space: 300M\n");
        let mut host = intel_host();
        host.disk.insert(
            DEFAULT_STORAGE_PATH.to_string(),
            DirStats {
                total: 1_000_000_000,
                avail: 1_000,
            },
        );
        let scored = score(&host, &m);
        assert_eq!(scored.score(), 0);
        assert_eq!(scored.issues(), ["host system disk space too small"]);
    }

    #[test]
    fn unmeasured_memory_aborts_the_batch() {
        let ok = manifest("");
        let needs_memory = manifest("memory: 1G\n");
        let mut host = intel_host();
        host.memory.total_ram = 0;

        let result = EngineScorer::new(&host, &AllConnected).score_all(&[ok, needs_memory]);
        assert!(matches!(
            result,
            Err(ScoreError::MeasurementMissing { ref reason, .. })
                if reason == "total memory not reported by host system"
        ));
    }

    #[test]
    fn allof_gives_no_partial_credit() {
        let m = manifest(
            r#"
devices:
  allof:
    - type: cpu
      architecture: amd64
      flags: [avx2]
    - type: gpu
      vendor-id: 0x10de
"#,
        );
        let scored = score(&intel_host(), &m);
        assert_eq!(scored.score(), 0);
        assert_eq!(
            scored.issues(),
            ["required pci device not found", "device not found"]
        );
    }

    #[test]
    fn allof_sums_passing_requirements() {
        let m = manifest(
            r#"
devices:
  allof:
    - type: cpu
      architecture: amd64
      flags: [avx2]
    - type: gpu
      vendor-id: 0x8086
"#,
        );
        let scored = score(&intel_host(), &m);
        let cpu = weights::CPU_DEVICE + weights::CPU_FLAG;
        let gpu = weights::PCI_DEVICE_TYPE;
        assert_eq!(scored.score(), cpu + gpu);
        assert!(scored.issues().is_empty());
    }

    #[test]
    fn unprefixed_vendor_id_matches_host_device() {
        let m = manifest("devices:\n  allof:\n    - type: gpu\n      vendor-id: 8086\n");
        let scored = score(&intel_host(), &m);
        assert_eq!(scored.score(), weights::PCI_DEVICE_TYPE);
        assert!(scored.issues().is_empty());
    }

    #[test]
    fn typeless_integrated_match_explains_zero_score() {
        let m = manifest("devices:\n  allof:\n    - vendor-id: 0x8086\n");
        let scored = score(&intel_host(), &m);
        assert_eq!(scored.score(), 0);
        assert_eq!(
            scored.issues(),
            [
                "required pci device not found",
                "pci 0000:00:02.0: matched device scored 0",
            ]
        );
    }

    #[test]
    fn richer_cpu_engine_is_selected() {
        let engine = |name: &str, flags: &str| {
            let doc = format!(
                "name: {name}\ndescription: d\nvendor: v\ngrade: stable\n\
                 devices:\n  allof:\n    - type: cpu\n      architecture: amd64\n      flags: {flags}\n"
            );
            parse_manifest(None, &doc).unwrap()
        };
        let manifests = [engine("cpu-avx1", "[avx]"), engine("cpu-avx2", "[avx, avx2]")];

        let host = intel_host();
        let scored = EngineScorer::new(&host, &AllConnected)
            .score_all(&manifests)
            .unwrap();
        assert_eq!(scored[0].score(), weights::CPU_DEVICE + weights::CPU_FLAG);
        assert_eq!(scored[1].score(), weights::CPU_DEVICE + 2 * weights::CPU_FLAG);
        assert_eq!(top_engine(&scored).unwrap().name(), "cpu-avx2");
    }

    #[test]
    fn anyof_sums_every_passing_requirement() {
        let m = manifest(
            r#"
devices:
  anyof:
    - type: cpu
      architecture: amd64
      flags: [avx]
    - type: cpu
      architecture: amd64
      flags: [avx, avx2]
    - type: gpu
      vendor-id: 0x10de
"#,
        );
        let scored = score(&intel_host(), &m);
        let first = weights::CPU_DEVICE + weights::CPU_FLAG;
        let second = weights::CPU_DEVICE + 2 * weights::CPU_FLAG;
        assert_eq!(scored.score(), first + second);
        assert!(scored.issues().is_empty());
    }

    #[test]
    fn anyof_without_any_match() {
        let m = manifest(
            r#"
devices:
  anyof:
    - type: cpu
      architecture: arm64
    - type: npu
      vendor-id: 0x8086
"#,
        );
        let scored = score(&intel_host(), &m);
        assert_eq!(scored.score(), 0);
        assert_eq!(
            scored.issues(),
            [
                "required device not found",
                "architecture not arm64",
                "pci 0000:00:02.0: device class 0x0300 not of required type npu",
            ]
        );
    }

    #[test]
    fn usb_fails_allof_but_only_annotates_anyof() {
        let allof = manifest("devices:\n  allof:\n    - type: npu\n      bus: usb\n");
        let scored = score(&intel_host(), &allof);
        assert_eq!(scored.score(), 0);
        assert_eq!(scored.issues(), [USB_NOT_IMPLEMENTED]);

        let anyof = manifest(
            r#"
devices:
  anyof:
    - type: npu
      bus: usb
    - type: cpu
      architecture: amd64
"#,
        );
        let scored = score(&intel_host(), &anyof);
        assert_eq!(scored.score(), weights::CPU_DEVICE);
        assert!(scored.is_compatible());
        assert_eq!(scored.issues(), [USB_NOT_IMPLEMENTED]);
    }

    #[test]
    fn empty_pci_list() {
        let m = manifest("devices:\n  allof:\n    - type: gpu\n");
        let mut host = intel_host();
        host.pci_devices.clear();
        let scored = score(&host, &m);
        assert_eq!(scored.score(), 0);
        assert!(
            scored
                .issues()
                .contains(&"no pci devices on host system".to_string())
        );
    }

    #[test]
    fn manifest_without_requirements_scores_zero() {
        let scored = score(&intel_host(), &manifest(""));
        assert_eq!(scored.score(), 0);
        assert!(!scored.is_compatible());
        assert!(scored.issues().is_empty());
    }

    #[test]
    fn scoring_is_deterministic() {
        let m = manifest("memory: 1G\ndevices:\n  anyof:\n    - type: gpu\n");
        let host = intel_host();
        assert_eq!(score(&host, &m), score(&host, &m));
    }
}
