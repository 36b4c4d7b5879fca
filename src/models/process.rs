// Ranked process rows for GET /metrics/processes/

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub status: String,
    /// ISO-8601 start time, when the OS reports one.
    pub started: Option<String>,
}
