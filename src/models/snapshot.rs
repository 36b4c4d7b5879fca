// Snapshot sections: the full /metrics/ payload, assembled fresh per request.

use serde::Serialize;

use super::{BatterySample, DiskSample, MemorySample, NetworkSample, SystemIdentity};
use crate::core_history::CoreHistoryPoint;
use crate::units::{bytes_to_gb, bytes_to_mb};

#[derive(Debug, Clone, Serialize)]
pub struct CpuSection {
    pub total_percent: f64,
    pub per_core_percent: Vec<f64>,
    /// Index = logical core.
    pub per_core_history: Vec<Vec<CoreHistoryPoint>>,
    pub cores: Option<u32>,
    pub threads: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RamSection {
    pub total_gb: f64,
    pub used_gb: f64,
    pub percent: f64,
}

impl From<MemorySample> for RamSection {
    fn from(m: MemorySample) -> Self {
        Self {
            total_gb: bytes_to_gb(m.total),
            used_gb: bytes_to_gb(m.used),
            percent: m.percent,
        }
    }
}

/// All five fields are null together when the root disk could not be read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiskSection {
    pub total_gb: Option<f64>,
    pub used_gb: Option<f64>,
    pub percent: Option<f64>,
    pub read_mb: Option<f64>,
    pub write_mb: Option<f64>,
}

impl DiskSection {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl From<DiskSample> for DiskSection {
    fn from(d: DiskSample) -> Self {
        Self {
            total_gb: Some(bytes_to_gb(d.total)),
            used_gb: Some(bytes_to_gb(d.used)),
            percent: Some(d.percent),
            read_mb: Some(bytes_to_mb(d.read_bytes)),
            write_mb: Some(bytes_to_mb(d.written_bytes)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkSection {
    pub sent_mb: f64,
    pub recv_mb: f64,
}

impl From<NetworkSample> for NetworkSection {
    fn from(n: NetworkSample) -> Self {
        Self {
            sent_mb: bytes_to_mb(n.bytes_sent),
            recv_mb: bytes_to_mb(n.bytes_recv),
        }
    }
}

/// Serializes as `{}` when no battery is present, never as null.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatterySection {
    #[serde(flatten)]
    pub status: Option<BatterySample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UptimeSection {
    pub start_time: String,
    /// `H:MM:SS`; hours keep counting past 24.
    pub uptime_str: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub cpu: CpuSection,
    pub ram: RamSection,
    pub disk: DiskSection,
    pub network: NetworkSection,
    pub battery: BatterySection,
    pub uptime: UptimeSection,
    pub system: SystemIdentity,
}
