//! Score contributions for satisfied criteria.
//!
//! Values are relative: a discrete accelerator outranks anything a CPU match
//! can add, and a matching device type outranks individual CPU flags.

pub const TPU: u32 = 1000;
pub const TPU_VENDOR: u32 = 200;

pub const PCI_DEVICE: u32 = 100;
pub const PCI_DEVICE_EXTERNAL: u32 = 50;
pub const PCI_DEVICE_ID: u32 = 30;
pub const PCI_VENDOR_ID: u32 = 20;
pub const PCI_DEVICE_TYPE: u32 = 10;
pub const GPU_VRAM: u32 = 10;
pub const GPU_COMPUTE_CAPABILITY: u32 = 10;

pub const CPU_DEVICE: u32 = 10;
pub const CPU_MODEL: u32 = 8;
pub const CPU_VENDOR: u32 = 6;
pub const CPU_FLAG: u32 = 1;

/// Added once per satisfied memory or disk requirement.
pub const RESOURCE: u32 = 1;
