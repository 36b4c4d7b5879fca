use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Metrics buffered before the writer flushes a batch.
    pub flush_rate: u64,
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
}

fn default_flush_interval_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Blocking window for the CPU usage read on /metrics/.
    #[serde(default = "default_cpu_window_ms")]
    pub cpu_window_ms: u64,
    /// 0 = per-process CPU is measured against the previous /metrics/processes/ call
    /// (the first call after startup reports 0 for every process).
    #[serde(default)]
    pub process_sample_window_ms: u64,
    #[serde(default = "default_top_processes")]
    pub top_processes: usize,
    /// Metrics queued for the writer before new ones are dropped.
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,
}

/// Lower bound on the CPU window; shorter windows give noisy instantaneous rates.
pub const MIN_CPU_WINDOW_MS: u64 = 500;

fn default_cpu_window_ms() -> u64 {
    MIN_CPU_WINDOW_MS
}

fn default_top_processes() -> usize {
    crate::process_ranker::TOP_PROCESSES
}

fn default_sink_capacity() -> usize {
    64
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cpu_window_ms: default_cpu_window_ms(),
            process_sample_window_ms: 0,
            top_processes: default_top_processes(),
            sink_capacity: default_sink_capacity(),
        }
    }
}

impl SamplingConfig {
    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_window_ms)
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.flush_rate > 0,
            "database.flush_rate must be > 0, got {}",
            self.database.flush_rate
        );
        anyhow::ensure!(
            self.database.flush_interval_secs > 0,
            "database.flush_interval_secs must be > 0, got {}",
            self.database.flush_interval_secs
        );
        anyhow::ensure!(
            self.sampling.cpu_window_ms >= MIN_CPU_WINDOW_MS,
            "sampling.cpu_window_ms must be >= {}, got {}",
            MIN_CPU_WINDOW_MS,
            self.sampling.cpu_window_ms
        );
        anyhow::ensure!(
            self.sampling.top_processes > 0,
            "sampling.top_processes must be > 0, got {}",
            self.sampling.top_processes
        );
        anyhow::ensure!(
            self.sampling.sink_capacity > 0,
            "sampling.sink_capacity must be > 0, got {}",
            self.sampling.sink_capacity
        );
        Ok(())
    }
}
