//! Live probing of the running Linux host.
//!
//! CPU and PCI information come straight from procfs/sysfs under a
//! configurable root so the probe can be pointed at a captured tree.
//! Memory and disk totals come from `sysinfo`.

use crate::cpuinfo::parse_cpuinfo;
use crate::error::{ProbeError, ProbeResult};
use crate::nvidia::{self, NVIDIA_VENDOR_ID};
use crate::pci::read_pci_devices;
use crate::source::HardwareSource;
use hwsel_kernel::selector::DEFAULT_STORAGE_PATH;
use hwsel_kernel::{DirStats, HardwareSnapshot, MemoryInfo};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{Disks, MemoryRefreshKind, RefreshKind, System};
use tracing::{debug, warn};

/// Probes the host this process runs on.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    root: PathBuf,
    storage_path: String,
    machine: String,
    query_nvidia: bool,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/"),
            storage_path: DEFAULT_STORAGE_PATH.to_string(),
            // target arch names coincide with `uname -m` for x86_64 and aarch64
            machine: std::env::consts::ARCH.to_string(),
            query_nvidia: true,
        }
    }

    /// Read `proc/` and `sys/` below `root` instead of `/`.
    ///
    /// `nvidia-smi` is not consulted for a non-default root since it would
    /// describe the live machine rather than the captured tree.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self.query_nvidia = self.root == Path::new("/");
        self
    }

    pub fn with_storage_path(mut self, storage_path: impl Into<String>) -> Self {
        self.storage_path = storage_path.into();
        self
    }

    /// Override the `uname -m` style machine name used to read cpuinfo.
    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = machine.into();
        self
    }

    pub fn storage_path(&self) -> &str {
        &self.storage_path
    }

    fn probe_cpus(&self) -> ProbeResult<Vec<hwsel_kernel::CpuDescriptor>> {
        let path = self.root.join("proc/cpuinfo");
        let text = fs::read_to_string(&path).map_err(ProbeError::io(path))?;
        parse_cpuinfo(&text, &self.machine)
    }

    fn probe_pci(&self) -> ProbeResult<Vec<hwsel_kernel::PciDescriptor>> {
        let mut devices = read_pci_devices(&self.root.join("sys/bus/pci/devices"))?;
        if !self.query_nvidia {
            return Ok(devices);
        }
        for device in devices
            .iter_mut()
            .filter(|d| d.vendor_id.get() == NVIDIA_VENDOR_ID)
        {
            match nvidia::gpu_properties(&device.slot) {
                Ok(properties) => device.additional_properties.extend(properties),
                Err(err) => warn!(slot = %device.slot, error = %err, "cannot query nvidia gpu"),
            }
        }
        Ok(devices)
    }

    fn probe_disk(&self) -> BTreeMap<String, DirStats> {
        let disks = Disks::new_with_refreshed_list();
        let storage = Path::new(&self.storage_path);
        let mount = disks
            .list()
            .iter()
            .filter(|disk| storage.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().components().count());

        let mut stats = BTreeMap::new();
        match mount {
            Some(disk) => {
                debug!(
                    path = %self.storage_path,
                    mount = %disk.mount_point().display(),
                    "resolved storage mount"
                );
                stats.insert(
                    self.storage_path.clone(),
                    DirStats {
                        total: disk.total_space(),
                        avail: disk.available_space(),
                    },
                );
            }
            None => warn!(path = %self.storage_path, "no mounted filesystem holds storage path"),
        }
        stats
    }
}

fn probe_memory() -> MemoryInfo {
    let mut sys = System::new_with_specifics(
        RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
    );
    sys.refresh_memory();
    MemoryInfo {
        total_ram: sys.total_memory(),
        total_swap: sys.total_swap(),
    }
}

impl HardwareSource for SystemProbe {
    fn snapshot(&self) -> ProbeResult<HardwareSnapshot> {
        let snapshot = HardwareSnapshot {
            cpus: self.probe_cpus()?,
            memory: probe_memory(),
            disk: self.probe_disk(),
            pci_devices: self.probe_pci()?,
        };
        debug!(
            cpus = snapshot.cpus.len(),
            pci = snapshot.pci_devices.len(),
            total_ram = snapshot.memory.total_ram,
            "probed host hardware"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwsel_kernel::{Architecture, HexId};
    use tempfile::TempDir;

    fn captured_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let proc_dir = tmp.path().join("proc");
        fs::create_dir_all(&proc_dir).unwrap();
        fs::write(
            proc_dir.join("cpuinfo"),
            "processor\t: 0\nvendor_id\t: AuthenticAMD\nflags\t\t: fpu sse2 avx avx2\n",
        )
        .unwrap();

        let gpu = tmp.path().join("sys/bus/pci/devices/0000:01:00.0");
        fs::create_dir_all(&gpu).unwrap();
        fs::write(gpu.join("class"), "0x030000\n").unwrap();
        fs::write(gpu.join("vendor"), "0x10de\n").unwrap();
        fs::write(gpu.join("device"), "0x2684\n").unwrap();
        tmp
    }

    #[test]
    fn probes_captured_tree() {
        let tmp = captured_tree();
        let probe = SystemProbe::new()
            .with_root(tmp.path())
            .with_machine("x86_64");
        let snapshot = probe.snapshot().unwrap();

        assert_eq!(snapshot.cpus.len(), 1);
        assert_eq!(snapshot.cpus[0].architecture, Architecture::Amd64);
        assert!(snapshot.cpus[0].flags.contains("avx2"));
        assert_eq!(snapshot.pci_devices.len(), 1);
        assert_eq!(snapshot.pci_devices[0].vendor_id, HexId(0x10de));
        // no nvidia-smi lookups against a captured tree
        assert!(snapshot.pci_devices[0].additional_properties.is_empty());
        assert!(snapshot.memory.total_ram > 0);
    }

    #[test]
    fn missing_cpuinfo_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = SystemProbe::new().with_root(tmp.path()).snapshot().unwrap_err();
        assert!(matches!(err, ProbeError::Io { .. }));
    }

    #[test]
    fn storage_path_is_configurable() {
        let probe = SystemProbe::new().with_storage_path("/srv/engines");
        assert_eq!(probe.storage_path(), "/srv/engines");
        assert_eq!(SystemProbe::default().storage_path(), DEFAULT_STORAGE_PATH);
    }
}
