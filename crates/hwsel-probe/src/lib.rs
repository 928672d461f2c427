//! # hwsel-probe
//!
//! Hardware snapshot sources for [`hwsel_kernel`].
//!
//! - [`SystemProbe`] reads the running Linux host (procfs, sysfs, `sysinfo`,
//!   `nvidia-smi` for NVIDIA GPUs).
//! - [`ReaderSource`] decodes a YAML or JSON snapshot document, usually
//!   from stdin.
//! - [`CachedSource`] memoizes another source as a JSON file.
//! - [`SnapctlGate`] answers connection checks through `snapctl`.
//!
//! ```rust,no_run
//! use hwsel_probe::{CachedSource, HardwareSource, SystemProbe};
//!
//! fn main() -> Result<(), hwsel_probe::ProbeError> {
//!     let source = CachedSource::new(SystemProbe::new(), "/tmp/hwsel", "host");
//!     let snapshot = source.snapshot()?;
//!     println!("{} pci devices", snapshot.pci_devices.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cpuinfo;
pub mod error;
pub mod gate;
pub mod nvidia;
pub mod pci;
pub mod source;
pub mod system;

pub use cache::CachedSource;
pub use error::{ProbeError, ProbeResult};
pub use gate::SnapctlGate;
pub use source::{HardwareSource, ReaderSource, StaticSource, decode_snapshot};
pub use system::SystemProbe;
