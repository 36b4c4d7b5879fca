// Host counters via sysinfo (plus battery / NVML for the optional capabilities)

mod battery;
mod gpu;
mod linux;

use crate::error::CollectError;
use crate::models::*;
use crate::units::usage_percent;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use sysinfo::{
    Disks, Networks, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind,
    Users,
};
use tracing::instrument;

/// One read per counter domain. Every method blocks; call from a blocking context.
///
/// CPU, memory, network and the partition/process listings are fundamental and
/// return errors. Disk, battery and GPU are capabilities: they report absence
/// instead of failing.
pub trait CounterSource: Send + Sync {
    /// Samples CPU usage over `window`; blocks for that long.
    fn read_cpu(&self, window: Duration) -> Result<CpuSample, CollectError>;
    fn read_memory(&self) -> Result<MemorySample, CollectError>;
    fn read_disk(&self, root: &Path) -> Capability<DiskSample>;
    fn read_network(&self) -> Result<NetworkSample, CollectError>;
    fn read_interfaces(&self) -> Result<Vec<InterfaceSample>, CollectError>;
    fn read_battery(&self) -> Capability<BatterySample>;
    fn read_gpus(&self) -> Vec<GpuDescriptor>;
    /// Partitions whose usage cannot be read are left out.
    fn read_partitions(&self) -> Result<Vec<PartitionSample>, CollectError>;
    /// With a zero `window` CPU percent is measured against the previous call.
    fn read_processes(&self, window: Duration) -> Result<Vec<ProcessSample>, CollectError>;
    /// Seconds since the UNIX epoch.
    fn boot_time(&self) -> u64;
    fn identity(&self) -> SystemIdentity;
}

struct ProcessTable {
    sys: System,
    primed: bool,
}

pub struct SysinfoRepo {
    mem: Mutex<System>,
    procs: Mutex<ProcessTable>,
    disks: Mutex<Disks>,
    networks: Mutex<Networks>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut mem = System::new();
        mem.refresh_memory();
        Self {
            mem: Mutex::new(mem),
            procs: Mutex::new(ProcessTable {
                sys: System::new(),
                primed: false,
            }),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }
}

impl CounterSource for SysinfoRepo {
    // A fresh System per call: concurrent requests each get their own window
    // instead of queueing behind one lock for 500ms apiece.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_cpu"))]
    fn read_cpu(&self, window: Duration) -> Result<CpuSample, CollectError> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        std::thread::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_usage();

        let cpus = sys.cpus();
        if cpus.is_empty() {
            return Err(CollectError::Cpu("no logical cpus reported".into()));
        }
        let per_core_percent: Vec<f64> = cpus
            .iter()
            .map(|c| f64::from(c.cpu_usage()).clamp(0.0, 100.0))
            .collect();

        Ok(CpuSample {
            total_percent: f64::from(sys.global_cpu_usage()).clamp(0.0, 100.0),
            per_core_percent,
            physical_cores: System::physical_core_count().map(|n| n as u32),
            logical_threads: cpus.len() as u32,
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_memory"))]
    fn read_memory(&self) -> Result<MemorySample, CollectError> {
        let mut sys = self
            .mem
            .lock()
            .map_err(|_| CollectError::LockPoisoned("sysinfo memory"))?;
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(CollectError::Memory("total memory reported as 0".into()));
        }
        let used = total.saturating_sub(sys.available_memory());
        Ok(MemorySample {
            total,
            used,
            percent: usage_percent(used, total),
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_disk"))]
    fn read_disk(&self, root: &Path) -> Capability<DiskSample> {
        let Ok(mut disks) = self.disks.lock() else {
            tracing::warn!(operation = "read_disk", "sysinfo disks lock poisoned");
            return Capability::Unavailable;
        };
        disks.refresh(true);

        let Some(disk) = disks.list().iter().find(|d| d.mount_point() == root) else {
            tracing::debug!(root = %root.display(), "no disk mounted at root path");
            return Capability::Unavailable;
        };
        let total = disk.total_space();
        if total == 0 {
            tracing::debug!(root = %root.display(), "root disk reports zero size");
            return Capability::Unavailable;
        }
        let used = total.saturating_sub(disk.available_space());

        // One device can back several mounts; count its IO once.
        let mut seen = HashSet::new();
        let (read_bytes, written_bytes) = disks
            .list()
            .iter()
            .filter(|d| seen.insert(d.name().to_os_string()))
            .map(|d| d.usage())
            .fold((0u64, 0u64), |(r, w), u| {
                (
                    r.saturating_add(u.total_read_bytes),
                    w.saturating_add(u.total_written_bytes),
                )
            });

        Capability::Available(DiskSample {
            total,
            used,
            percent: usage_percent(used, total),
            read_bytes,
            written_bytes,
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_network"))]
    fn read_network(&self) -> Result<NetworkSample, CollectError> {
        let mut networks = self
            .networks
            .lock()
            .map_err(|_| CollectError::LockPoisoned("sysinfo networks"))?;
        networks.refresh(true);
        Ok(networks
            .list()
            .values()
            .fold(NetworkSample::default(), |acc, data| NetworkSample {
                bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
                packets_sent: acc
                    .packets_sent
                    .saturating_add(data.total_packets_transmitted()),
                packets_recv: acc.packets_recv.saturating_add(data.total_packets_received()),
            }))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_interfaces"))]
    fn read_interfaces(&self) -> Result<Vec<InterfaceSample>, CollectError> {
        let mut networks = self
            .networks
            .lock()
            .map_err(|_| CollectError::LockPoisoned("sysinfo networks"))?;
        networks.refresh(true);
        let mut interfaces: Vec<InterfaceSample> = networks
            .list()
            .iter()
            .map(|(name, data)| {
                let (dropin, dropout) = linux::read_interface_drops(name);
                InterfaceSample {
                    name: name.clone(),
                    bytes_sent: data.total_transmitted(),
                    bytes_recv: data.total_received(),
                    packets_sent: data.total_packets_transmitted(),
                    packets_recv: data.total_packets_received(),
                    errin: data.total_errors_on_received(),
                    errout: data.total_errors_on_transmitted(),
                    dropin,
                    dropout,
                }
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(interfaces)
    }

    #[instrument(skip(self), fields(repo = "battery", operation = "read_battery"))]
    fn read_battery(&self) -> Capability<BatterySample> {
        battery::read_battery()
    }

    #[instrument(skip(self), fields(repo = "nvml", operation = "read_gpus"))]
    fn read_gpus(&self) -> Vec<GpuDescriptor> {
        gpu::read_gpus()
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_partitions"))]
    fn read_partitions(&self) -> Result<Vec<PartitionSample>, CollectError> {
        let mut disks = self
            .disks
            .lock()
            .map_err(|_| CollectError::LockPoisoned("sysinfo disks"))?;
        disks.refresh(true);

        let mut partitions = Vec::with_capacity(disks.list().len());
        for d in disks.list() {
            let mountpoint = d.mount_point().to_string_lossy().into_owned();
            let total = d.total_space();
            // statvfs failures (EACCES on another user's mount) surface as a zero-sized disk
            if total == 0 {
                tracing::debug!(mountpoint = %mountpoint, "skipping unreadable partition");
                continue;
            }
            let free = d.available_space();
            let used = total.saturating_sub(free);
            let mut opts = String::from(if d.is_read_only() { "ro" } else { "rw" });
            if d.is_removable() {
                opts.push_str(",removable");
            }
            partitions.push(PartitionSample {
                device: d.name().to_string_lossy().into_owned(),
                mountpoint,
                fstype: d.file_system().to_string_lossy().into_owned(),
                opts,
                total,
                used,
                free,
                percent: usage_percent(used, total),
            });
        }
        Ok(partitions)
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_processes"))]
    fn read_processes(&self, window: Duration) -> Result<Vec<ProcessSample>, CollectError> {
        let mut table = self
            .procs
            .lock()
            .map_err(|_| CollectError::LockPoisoned("sysinfo processes"))?;
        let kind = ProcessRefreshKind::nothing()
            .with_cpu()
            .with_memory()
            .with_exe(UpdateKind::OnlyIfNotSet);

        table.sys.refresh_memory();
        table
            .sys
            .refresh_processes_specifics(ProcessesToUpdate::All, true, kind);
        if !window.is_zero() {
            std::thread::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
            table
                .sys
                .refresh_processes_specifics(ProcessesToUpdate::All, true, kind);
        }
        let has_baseline = table.primed || !window.is_zero();
        table.primed = true;

        // Processes that exited or denied access between refreshes are already
        // dropped (remove_dead) or carry zeroed counters; nothing here can fail.
        let total_memory = table.sys.total_memory();
        Ok(table
            .sys
            .processes()
            .iter()
            .map(|(pid, p)| ProcessSample {
                pid: pid.as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                cpu_percent: has_baseline.then(|| f64::from(p.cpu_usage())),
                memory_percent: if total_memory > 0 {
                    p.memory() as f64 / total_memory as f64 * 100.0
                } else {
                    0.0
                },
                status: status_name(p.status()).to_string(),
                create_time: Some(p.start_time()).filter(|&t| t > 0),
            })
            .collect())
    }

    fn boot_time(&self) -> u64 {
        System::boot_time()
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "identity"))]
    fn identity(&self) -> SystemIdentity {
        let os = os_family().to_string();
        let kernel = System::kernel_version().unwrap_or_default();
        let architecture = std::env::consts::ARCH.to_string();
        let platform = if kernel.is_empty() {
            format!("{}-{}", os, architecture)
        } else {
            format!("{}-{}-{}", os, kernel, architecture)
        };
        let processor = linux::read_cpu_model_linux()
            .or_else(|| {
                let mut sys = System::new();
                sys.refresh_cpu_all();
                sys.cpus()
                    .first()
                    .map(|c| c.brand().trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| architecture.clone());

        SystemIdentity {
            hostname: System::host_name().unwrap_or_default(),
            os,
            os_version: System::long_os_version()
                .or_else(System::os_version)
                .unwrap_or_default(),
            platform,
            architecture,
            processor,
            user: current_user(),
        }
    }
}

/// Kernel family name as the host reports it ("Linux", "Windows", "Darwin").
fn os_family() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "windows" => "Windows",
        "macos" => "Darwin",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

/// Owner of the serving process, resolved through the user database.
fn current_user() -> Option<String> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        false,
        ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
    );
    let uid = sys.process(pid)?.user_id()?.clone();
    let users = Users::new_with_refreshed_list();
    users.get_user_by_id(&uid).map(|u| u.name().to_string())
}

/// Process state in the vocabulary dashboards expect ("running", "sleeping", ...).
/// sysinfo's Display names differ ("Runnable", "Sleeping").
fn status_name(status: ProcessStatus) -> &'static str {
    match status {
        ProcessStatus::Run => "running",
        ProcessStatus::Sleep => "sleeping",
        ProcessStatus::Idle => "idle",
        ProcessStatus::Stop => "stopped",
        ProcessStatus::Zombie => "zombie",
        ProcessStatus::Tracing => "tracing-stop",
        ProcessStatus::Dead => "dead",
        ProcessStatus::Wakekill => "wake-kill",
        ProcessStatus::Waking => "waking",
        ProcessStatus::Parked => "parked",
        ProcessStatus::LockBlocked => "locked",
        ProcessStatus::UninterruptibleDiskSleep => "disk-sleep",
        _ => "unknown",
    }
}
