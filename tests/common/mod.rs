// Shared test helpers: scripted counter source, recording sink, stepping clock
#![allow(dead_code)]

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use sysmetrics::assembler::{Clock, SnapshotAssembler};
use sysmetrics::core_history::CoreHistory;
use sysmetrics::error::CollectError;
use sysmetrics::metric_writer::MetricSink;
use sysmetrics::models::*;
use sysmetrics::sysinfo_repo::CounterSource;

pub const GIB: u64 = 1024 * 1024 * 1024;
pub const MIB: u64 = 1024 * 1024;

/// Counter source with canned answers. Per-core CPU values are popped from `cpu_script`
/// one call at a time; once empty, `cpu_fallback` repeats.
pub struct FakeSource {
    pub cpu_script: Mutex<VecDeque<Vec<f64>>>,
    pub cpu_fallback: Vec<f64>,
    pub cpu_fails: bool,
    pub memory_fails: bool,
    pub memory: MemorySample,
    pub disk: Option<DiskSample>,
    pub network: NetworkSample,
    pub interfaces: Vec<InterfaceSample>,
    pub battery: Option<BatterySample>,
    pub gpus: Vec<GpuDescriptor>,
    pub partitions: Vec<PartitionSample>,
    pub processes: Vec<ProcessSample>,
    pub boot_time: u64,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            cpu_script: Mutex::new(VecDeque::new()),
            cpu_fallback: vec![10.0, 20.0],
            cpu_fails: false,
            memory_fails: false,
            memory: MemorySample {
                total: 16 * GIB,
                used: 4 * GIB,
                percent: 25.0,
            },
            disk: Some(DiskSample {
                total: 512 * GIB,
                used: 128 * GIB,
                percent: 25.0,
                read_bytes: 300 * MIB,
                written_bytes: 150 * MIB + MIB / 2,
            }),
            network: NetworkSample {
                bytes_sent: 10 * MIB,
                bytes_recv: 20 * MIB + MIB / 4,
                packets_sent: 100,
                packets_recv: 200,
            },
            interfaces: vec![],
            battery: None,
            gpus: vec![],
            partitions: vec![],
            processes: vec![],
            boot_time: 1_700_000_000,
        }
    }
}

impl FakeSource {
    pub fn with_cpu_script(script: Vec<Vec<f64>>) -> Self {
        let fallback = script.last().cloned().unwrap_or_else(|| vec![10.0, 20.0]);
        Self {
            cpu_script: Mutex::new(script.into()),
            cpu_fallback: fallback,
            ..Self::default()
        }
    }
}

impl CounterSource for FakeSource {
    fn read_cpu(&self, _window: Duration) -> Result<CpuSample, CollectError> {
        if self.cpu_fails {
            return Err(CollectError::Cpu("injected failure".into()));
        }
        let per_core = self
            .cpu_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.cpu_fallback.clone());
        let total = if per_core.is_empty() {
            0.0
        } else {
            per_core.iter().sum::<f64>() / per_core.len() as f64
        };
        Ok(CpuSample {
            total_percent: total,
            logical_threads: per_core.len() as u32,
            physical_cores: Some((per_core.len() as u32).div_ceil(2)),
            per_core_percent: per_core,
        })
    }

    fn read_memory(&self) -> Result<MemorySample, CollectError> {
        if self.memory_fails {
            return Err(CollectError::Memory("injected failure".into()));
        }
        Ok(self.memory.clone())
    }

    fn read_disk(&self, _root: &Path) -> Capability<DiskSample> {
        self.disk.clone().into()
    }

    fn read_network(&self) -> Result<NetworkSample, CollectError> {
        Ok(self.network.clone())
    }

    fn read_interfaces(&self) -> Result<Vec<InterfaceSample>, CollectError> {
        Ok(self.interfaces.clone())
    }

    fn read_battery(&self) -> Capability<BatterySample> {
        self.battery.clone().into()
    }

    fn read_gpus(&self) -> Vec<GpuDescriptor> {
        self.gpus.clone()
    }

    fn read_partitions(&self) -> Result<Vec<PartitionSample>, CollectError> {
        Ok(self.partitions.clone())
    }

    fn read_processes(&self, _window: Duration) -> Result<Vec<ProcessSample>, CollectError> {
        Ok(self.processes.clone())
    }

    fn boot_time(&self) -> u64 {
        self.boot_time
    }

    fn identity(&self) -> SystemIdentity {
        SystemIdentity {
            hostname: "testhost".into(),
            os: "Linux".into(),
            os_version: "Linux (Test 1.0)".into(),
            platform: "Linux-6.1.0-x86_64".into(),
            architecture: "x86_64".into(),
            processor: "Test CPU".into(),
            user: Some("tester".into()),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    metrics: Mutex<Vec<Metric>>,
}

impl RecordingSink {
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.lock().unwrap().clone()
    }
}

impl MetricSink for RecordingSink {
    fn record(&self, metric: Metric) {
        self.metrics.lock().unwrap().push(metric);
    }
}

/// Advances one second per `now()` call, starting at `start`.
pub struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + ChronoDuration::seconds(1);
        now
    }
}

pub fn test_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 11, 15, 0, 0, 0).unwrap()
}

pub fn assembler_with_sink(
    source: Arc<FakeSource>,
    sink: Arc<dyn MetricSink>,
) -> SnapshotAssembler {
    assembler_with_clock(
        source,
        sink,
        Arc::new(StepClock::starting_at(test_start())),
    )
}

pub fn assembler_with_clock(
    source: Arc<FakeSource>,
    sink: Arc<dyn MetricSink>,
    clock: Arc<dyn Clock>,
) -> SnapshotAssembler {
    SnapshotAssembler::new(
        source,
        Arc::new(CoreHistory::new()),
        sink,
        clock,
        Duration::ZERO,
    )
}

pub fn test_assembler(source: FakeSource) -> (SnapshotAssembler, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let assembler = assembler_with_sink(Arc::new(source), sink.clone());
    (assembler, sink)
}

pub fn process(pid: u32, cpu: Option<f64>) -> ProcessSample {
    ProcessSample {
        pid,
        name: format!("proc-{}", pid),
        cpu_percent: cpu,
        memory_percent: 0.5,
        status: "sleeping".into(),
        create_time: Some(1_700_000_000),
    }
}
