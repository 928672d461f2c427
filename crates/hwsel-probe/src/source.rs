use crate::error::ProbeResult;
use hwsel_kernel::HardwareSnapshot;
use std::io::Read;
use tracing::debug;

/// Anything that can produce a [`HardwareSnapshot`].
pub trait HardwareSource {
    fn snapshot(&self) -> ProbeResult<HardwareSnapshot>;
}

impl<S: HardwareSource + ?Sized> HardwareSource for &S {
    fn snapshot(&self) -> ProbeResult<HardwareSnapshot> {
        (**self).snapshot()
    }
}

impl<S: HardwareSource + ?Sized> HardwareSource for Box<S> {
    fn snapshot(&self) -> ProbeResult<HardwareSnapshot> {
        (**self).snapshot()
    }
}

/// A snapshot document read from a stream, typically stdin.
///
/// The whole stream is consumed up front. JSON documents are decoded with
/// `serde_json`, everything else as YAML.
#[derive(Debug, Clone)]
pub struct ReaderSource {
    document: String,
}

impl ReaderSource {
    pub fn from_reader<R: Read>(mut reader: R) -> ProbeResult<Self> {
        let mut document = String::new();
        reader.read_to_string(&mut document)?;
        Ok(Self { document })
    }

    pub fn from_document(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl HardwareSource for ReaderSource {
    fn snapshot(&self) -> ProbeResult<HardwareSnapshot> {
        decode_snapshot(&self.document)
    }
}

pub fn decode_snapshot(document: &str) -> ProbeResult<HardwareSnapshot> {
    let trimmed = document.trim_start();
    let snapshot = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed)?
    } else {
        serde_yaml::from_str(trimmed)?
    };
    debug!("decoded hardware snapshot document");
    Ok(snapshot)
}

/// A fixed snapshot, for tests and for callers that already hold one.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub HardwareSnapshot);

impl HardwareSource for StaticSource {
    fn snapshot(&self) -> ProbeResult<HardwareSnapshot> {
        Ok(self.0.clone())
    }
}
