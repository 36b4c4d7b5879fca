// Domain models: raw samples, snapshot sections, detail-endpoint rows, persisted metric

mod gpu;
mod metric;
mod network;
mod process;
mod sample;
mod snapshot;
mod storage;

pub use gpu::GpuDescriptor;
pub use metric::Metric;
pub use network::InterfaceCounters;
pub use process::ProcessEntry;
pub use sample::{
    BatterySample, Capability, CpuSample, DiskSample, InterfaceSample, MemorySample,
    NetworkSample, PartitionSample, ProcessSample, SystemIdentity,
};
pub use snapshot::{
    BatterySection, CpuSection, DiskSection, NetworkSection, RamSection, Snapshot, UptimeSection,
};
pub use storage::PartitionUsage;
