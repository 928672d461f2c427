//! Compatibility scoring and engine selection.
//!
//! [`EngineScorer`] turns each manifest into a [`ScoredManifest`]; the CPU and
//! PCI matchers score individual device requirements; [`top_engine`] picks
//! the one engine to activate.

pub mod cpu;
mod gate;
pub mod pci;
mod score;
mod top;
pub mod weights;

pub use gate::{AllConnected, ConnectionGate};
pub use score::{DEFAULT_STORAGE_PATH, EngineScorer};
pub use top::{display_order, top_engine};

use crate::manifest::{EngineManifest, Grade};
use serde::Serialize;

/// Outcome of matching one device requirement against the snapshot.
///
/// A score of zero means the requirement is unmet; `issues` then explains why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMatch {
    pub score: u32,
    pub issues: Vec<String>,
}

impl DeviceMatch {
    pub fn passed(score: u32) -> Self {
        Self {
            score,
            issues: Vec::new(),
        }
    }

    pub fn failed(issues: Vec<String>) -> Self {
        Self { score: 0, issues }
    }

    pub fn is_match(&self) -> bool {
        self.score > 0
    }
}

/// A manifest together with its score against one snapshot.
///
/// `compatible` is always `score > 0`; the constructor is the only way to
/// build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScoredManifest {
    #[serde(flatten)]
    pub manifest: EngineManifest,
    score: u32,
    compatible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    compatibility_issues: Vec<String>,
}

impl ScoredManifest {
    pub fn new(manifest: EngineManifest, score: u32, issues: Vec<String>) -> Self {
        Self {
            manifest,
            score,
            compatible: score > 0,
            compatibility_issues: issues,
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_compatible(&self) -> bool {
        self.compatible
    }

    /// A manifest that somehow lacks a grade is never treated as stable.
    pub fn grade(&self) -> Grade {
        self.manifest.grade.unwrap_or(Grade::Devel)
    }

    pub fn issues(&self) -> &[String] {
        &self.compatibility_issues
    }
}
