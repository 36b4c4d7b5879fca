// Raw counter reads, one per domain. Byte fields are unconverted; the snapshot sections round them.

use serde::{Deserialize, Serialize};

/// Result of reading an optional host capability (battery, root disk).
#[derive(Debug, Clone, PartialEq)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Capability::Available(v) => Some(v),
            Capability::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Capability::Available(v),
            None => Capability::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CpuSample {
    pub total_percent: f64,
    pub per_core_percent: Vec<f64>,
    /// None when the platform cannot tell physical cores apart.
    pub physical_cores: Option<u32>,
    pub logical_threads: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySample {
    pub total: u64,
    pub used: u64,
    pub percent: f64,
}

/// Root filesystem usage plus cumulative IO since boot.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskSample {
    pub total: u64,
    pub used: u64,
    pub percent: f64,
    pub read_bytes: u64,
    pub written_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSample {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSample {
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    pub dropin: u64,
    pub dropout: u64,
}

/// Wire shape is the same as the read, so this doubles as the battery section body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySample {
    pub percent: f64,
    pub plugged_in: bool,
    /// Seconds until empty; None while charging or when the driver cannot estimate.
    pub secs_left: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSample {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub opts: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    /// None until the process table has a CPU baseline to diff against.
    pub cpu_percent: Option<f64>,
    pub memory_percent: f64,
    pub status: String,
    /// Seconds since the UNIX epoch.
    pub create_time: Option<u64>,
}

/// Static host identity; serialized as the `system` section of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemIdentity {
    pub hostname: String,
    pub os: String,
    pub os_version: String,
    pub platform: String,
    pub architecture: String,
    pub processor: String,
    pub user: Option<String>,
}
