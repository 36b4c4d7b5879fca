// GPU descriptor for GET /metrics/gpu/

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuDescriptor {
    pub id: u32,
    pub name: String,
    /// Utilization percent, 0–100.
    pub load: f64,
    pub memory_total_mb: f64,
    pub memory_used_mb: f64,
    pub memory_free_mb: f64,
    pub temperature_c: Option<f64>,
    pub fan_speed: Option<f64>,
}
