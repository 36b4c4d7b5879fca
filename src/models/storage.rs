// Partition rows for GET /metrics/disk/

use serde::{Deserialize, Serialize};

use super::PartitionSample;
use crate::units::bytes_to_gb;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionUsage {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub opts: String,
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub percent: f64,
}

impl From<PartitionSample> for PartitionUsage {
    fn from(p: PartitionSample) -> Self {
        Self {
            device: p.device,
            mountpoint: p.mountpoint,
            fstype: p.fstype,
            opts: p.opts,
            total_gb: bytes_to_gb(p.total),
            used_gb: bytes_to_gb(p.used),
            free_gb: bytes_to_gb(p.free),
            percent: p.percent,
        }
    }
}
