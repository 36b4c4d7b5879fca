// Per-interface counter rows for GET /metrics/network/

use serde::{Deserialize, Serialize};

use super::InterfaceSample;
use crate::units::bytes_to_mb;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub interface: String,
    pub bytes_sent_mb: f64,
    pub bytes_recv_mb: f64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    pub dropin: u64,
    pub dropout: u64,
}

impl From<InterfaceSample> for InterfaceCounters {
    fn from(i: InterfaceSample) -> Self {
        Self {
            interface: i.name,
            bytes_sent_mb: bytes_to_mb(i.bytes_sent),
            bytes_recv_mb: bytes_to_mb(i.bytes_recv),
            packets_sent: i.packets_sent,
            packets_recv: i.packets_recv,
            errin: i.errin,
            errout: i.errout,
            dropin: i.dropin,
            dropout: i.dropout,
        }
    }
}
