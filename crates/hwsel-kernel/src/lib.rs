//! # hwsel-kernel
//!
//! Constraint-based compatibility scoring for hardware acceleration engines.
//!
//! Given a [`HardwareSnapshot`] of the machine and a set of declarative
//! [`EngineManifest`]s, the kernel produces one [`ScoredManifest`] per engine
//! (score, compatibility flag, human-readable issues) and can pick the single
//! best stable engine.
//!
//! ```text
//!    manifest::load_manifests(dir)        HardwareSnapshot
//!               │ Vec<EngineManifest>            │
//!               └──────────────┬─────────────────┘
//!                    selector::EngineScorer
//!                  (cpu matcher, pci matcher)
//!                              │ Vec<ScoredManifest>
//!                    selector::top_engine
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwsel_kernel::manifest::load_manifests;
//! use hwsel_kernel::selector::{top_engine, AllConnected, EngineScorer};
//! use hwsel_kernel::HardwareSnapshot;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let snapshot: HardwareSnapshot = serde_yaml::from_str("cpus: []")?;
//!     let manifests = load_manifests("engines".as_ref())?;
//!     let scored = EngineScorer::new(&snapshot, &AllConnected).score_all(&manifests)?;
//!     println!("top engine: {}", top_engine(&scored)?.manifest.name);
//!     Ok(())
//! }
//! ```
//!
//! Scoring is a pure function of `(manifest, snapshot)`; nothing in this crate
//! performs I/O except the manifest loader.

pub mod error;
pub mod hardware;
pub mod manifest;
pub mod selector;
pub mod units;

pub use error::{ManifestError, ScoreError, SelectError, ValidationError};
pub use hardware::{
    Architecture, CpuDescriptor, DirStats, HardwareSnapshot, MemoryInfo, PciDescriptor,
};
pub use manifest::{DeviceRequirement, DeviceType, EngineManifest, Grade};
pub use selector::{ScoredManifest, top_engine};
pub use units::{ByteSize, ComputeCapability, HexId};
