//! Small value types shared by manifests and hardware snapshots.
//!
//! - [`HexId`]: vendor/device/class ids, compared numerically so that
//!   `0xB33F == 0xb33f`.
//! - [`ByteSize`]: `<digits>[M|G]` sizes used for memory, disk and vRAM.
//! - [`ComputeCapability`]: `major.minor` versions reported by GPU tooling.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

// ============================================================================
// HexId
// ============================================================================

/// A hexadecimal identifier such as a PCI vendor id or an arm64 part number.
///
/// Decodes from scalar text with an optional `0x` prefix in either case. The
/// digits are always hexadecimal, so an unquoted YAML `8086` is `0x8086`.
/// Always encodes as a lowercase, zero-padded `0x` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HexId(pub u32);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid hex id {input:?}")]
pub struct HexIdError {
    input: String,
}

impl HexId {
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for HexId {
    type Err = HexIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HexIdError {
                input: s.to_string(),
            });
        }
        u32::from_str_radix(digits, 16)
            .map(HexId)
            .map_err(|_| HexIdError {
                input: s.to_string(),
            })
    }
}

impl From<u32> for HexId {
    fn from(value: u32) -> Self {
        HexId(value)
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

impl fmt::LowerHex for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Serialize for HexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexIdVisitor;

        impl Visitor<'_> for HexIdVisitor {
            type Value = HexId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hexadecimal id such as 0x10de")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<HexId, E> {
                v.parse().map_err(E::custom)
            }
        }

        // YAML hands over the scalar text untouched, so `8086` and `0x8086`
        // never reach us as differently-based integers.
        deserializer.deserialize_str(HexIdVisitor)
    }
}

// ============================================================================
// ByteSize
// ============================================================================

/// A size in bytes, written as `<digits>[M|G]`.
///
/// `M` scales by 1,048,576 and `G` by 1,073,741,824; bare digits are bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("invalid size {0:?}: expected <digits>[M|G]")]
    Invalid(String),

    #[error("size {0:?} does not fit in 64 bits")]
    Overflow(String),
}

impl ByteSize {
    pub const fn from_bytes(bytes: u64) -> Self {
        ByteSize(bytes)
    }

    pub const fn bytes(self) -> u64 {
        self.0
    }
}

impl FromStr for ByteSize {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, scale) = if let Some(d) = s.strip_suffix('G') {
            (d, GIB)
        } else if let Some(d) = s.strip_suffix('M') {
            (d, MIB)
        } else {
            (s, 1)
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SizeError::Invalid(s.to_string()));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| SizeError::Overflow(s.to_string()))?;
        value
            .checked_mul(scale)
            .map(ByteSize)
            .ok_or_else(|| SizeError::Overflow(s.to_string()))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "0"),
            b if b % GIB == 0 => write!(f, "{}G", b / GIB),
            b if b % MIB == 0 => write!(f, "{}M", b / MIB),
            b => write!(f, "{b}"),
        }
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ByteSizeVisitor;

        impl Visitor<'_> for ByteSizeVisitor {
            type Value = ByteSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a size such as 512M, 4G or a number of bytes")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ByteSize, E> {
                Ok(ByteSize(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ByteSize, E> {
                u64::try_from(v)
                    .map(ByteSize)
                    .map_err(|_| E::custom(format!("negative size: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ByteSize, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ByteSizeVisitor)
    }
}

/// Format a byte count with a binary unit for display, e.g. `1.5GiB`.
pub fn fmt_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b > KIB * KIB * KIB * KIB {
        format!("{:.1}TiB", b / (KIB * KIB * KIB * KIB))
    } else if b > KIB * KIB * KIB {
        format!("{:.1}GiB", b / (KIB * KIB * KIB))
    } else if b > KIB * KIB {
        format!("{:.1}MiB", b / (KIB * KIB))
    } else if b > KIB {
        format!("{:.1}KiB", b / KIB)
    } else {
        bytes.to_string()
    }
}

// ============================================================================
// ComputeCapability
// ============================================================================

/// A GPU compute capability such as `8.6`, ordered by `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComputeCapability {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid compute capability {0:?}: expected <major>[.<minor>]")]
pub struct CapabilityError(String);

impl FromStr for ComputeCapability {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CapabilityError(s.to_string());
        let (major, minor) = match s.trim().split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s.trim(), "0"),
        };
        Ok(ComputeCapability {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for ComputeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for ComputeCapability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComputeCapability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CapabilityVisitor;

        impl Visitor<'_> for CapabilityVisitor {
            type Value = ComputeCapability;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a compute capability such as \"8.6\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ComputeCapability, E> {
                v.parse().map_err(E::custom)
            }
        }

        // Read as text so an unquoted `7.10` keeps its minor version instead
        // of collapsing to the float 7.1.
        deserializer.deserialize_str(CapabilityVisitor)
    }
}
