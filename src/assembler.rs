// Builds one full Snapshot per /metrics/ request.
// Each call advances the per-core history and records one headline Metric.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::instrument;

use crate::core_history::CoreHistory;
use crate::error::CollectError;
use crate::metric_writer::MetricSink;
use crate::models::*;
use crate::sysinfo_repo::CounterSource;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct SnapshotAssembler {
    source: Arc<dyn CounterSource>,
    history: Arc<CoreHistory>,
    sink: Arc<dyn MetricSink>,
    clock: Arc<dyn Clock>,
    cpu_window: Duration,
}

impl SnapshotAssembler {
    pub fn new(
        source: Arc<dyn CounterSource>,
        history: Arc<CoreHistory>,
        sink: Arc<dyn MetricSink>,
        clock: Arc<dyn Clock>,
        cpu_window: Duration,
    ) -> Self {
        Self {
            source,
            history,
            sink,
            clock,
            cpu_window,
        }
    }

    pub fn history(&self) -> &Arc<CoreHistory> {
        &self.history
    }

    /// Runs the whole assembly on the blocking pool; the CPU window dominates latency.
    pub async fn assemble(&self) -> Result<Snapshot, CollectError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.assemble_blocking()).await?
    }

    /// Only CPU, memory and network failures propagate. Disk and battery degrade.
    #[instrument(skip(self), fields(operation = "assemble_snapshot", cpu_window_ms = self.cpu_window.as_millis() as u64))]
    pub fn assemble_blocking(&self) -> Result<Snapshot, CollectError> {
        // Every read that can fail the request comes first, so a failed call
        // leaves the history and the sink untouched.
        let cpu = self.source.read_cpu(self.cpu_window)?;
        let memory = self.source.read_memory()?;
        let ram_percent = memory.percent;
        let network = NetworkSection::from(self.source.read_network()?);

        let (sampled_at, per_core_history) = self
            .history
            .record_and_snapshot(&cpu.per_core_percent, || self.clock.now())?;

        let root = root_path();
        let disk = match self.source.read_disk(&root) {
            Capability::Available(d) => DiskSection::from(d),
            Capability::Unavailable => {
                tracing::debug!(root = %root.display(), "root disk unavailable, disk fields null");
                DiskSection::unavailable()
            }
        };

        let battery = self.source.read_battery().into_option();

        self.sink.record(Metric {
            timestamp: sampled_at,
            cpu_percent: cpu.total_percent,
            ram_percent,
            battery_percent: battery.as_ref().map(|b| b.percent),
        });

        let now = self.clock.now();
        let uptime = uptime_section(self.source.boot_time(), now);
        let system = self.source.identity();

        Ok(Snapshot {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, false),
            cpu: CpuSection {
                total_percent: cpu.total_percent,
                per_core_percent: cpu.per_core_percent,
                per_core_history,
                cores: cpu.physical_cores,
                threads: cpu.logical_threads,
            },
            ram: RamSection::from(memory),
            disk,
            network,
            battery: BatterySection { status: battery },
            uptime,
            system,
        })
    }
}

/// Filesystem root whose usage is reported in the snapshot.
pub fn root_path() -> PathBuf {
    if cfg!(windows) {
        let drive = std::env::var("SystemDrive").unwrap_or_else(|_| "C:".into());
        PathBuf::from(format!("{}\\", drive))
    } else {
        PathBuf::from("/")
    }
}

fn uptime_section(boot_time_secs: u64, now: DateTime<Utc>) -> UptimeSection {
    // Both ends in UTC so the subtraction never straddles a zone offset.
    let boot = i64::try_from(boot_time_secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(now);
    let elapsed = (now - boot).num_seconds().max(0);
    UptimeSection {
        start_time: boot.to_rfc3339_opts(SecondsFormat::Secs, false),
        uptime_str: format_uptime(elapsed),
    }
}

/// `H:MM:SS` from whole seconds. Hours are not folded into days.
pub fn format_uptime(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
