// Top-N processes by CPU usage.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat};
use tracing::instrument;

use crate::error::CollectError;
use crate::models::{ProcessEntry, ProcessSample};
use crate::sysinfo_repo::CounterSource;
use crate::units::round2;

/// Default length of the ranked list.
pub const TOP_PROCESSES: usize = 50;

/// Sort by cpu_percent descending (missing or non-finite counts as 0) and keep the first `limit`.
/// Ties keep enumeration order.
pub fn rank(samples: Vec<ProcessSample>, limit: usize) -> Vec<ProcessEntry> {
    let mut entries: Vec<ProcessEntry> = samples.into_iter().map(to_entry).collect();
    entries.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    entries.truncate(limit);
    entries
}

fn to_entry(sample: ProcessSample) -> ProcessEntry {
    ProcessEntry {
        pid: sample.pid,
        name: sample.name,
        cpu_percent: sample.cpu_percent.filter(|c| c.is_finite()).unwrap_or(0.0),
        memory_percent: round2(sample.memory_percent),
        status: sample.status,
        started: sample
            .create_time
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, false)),
    }
}

/// Enumerate and rank on the blocking pool; a non-zero `window` blocks for that long.
#[instrument(skip(source), fields(operation = "top_processes"))]
pub async fn top_processes(
    source: Arc<dyn CounterSource>,
    window: Duration,
    limit: usize,
) -> Result<Vec<ProcessEntry>, CollectError> {
    let samples = tokio::task::spawn_blocking(move || source.read_processes(window)).await??;
    let total = samples.len();
    let ranked = rank(samples, limit);
    tracing::debug!(processes_seen = total, returned = ranked.len(), "processes ranked");
    Ok(ranked)
}
