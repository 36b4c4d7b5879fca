// Persistence sink for headline metrics.
// The assembler hands metrics to a bounded channel; a dedicated writer task batches them into SQLite.

use crate::metric_repo::MetricRepo;
use crate::models::Metric;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Duration, interval};

/// Fire-and-forget destination for one metric per snapshot. Must not block or fail the caller.
pub trait MetricSink: Send + Sync {
    fn record(&self, metric: Metric);
}

/// Sender half handed to the assembler. Drops (and logs) when the writer is behind or gone.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Metric>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Metric>) -> Self {
        Self { tx }
    }
}

impl MetricSink for ChannelSink {
    fn record(&self, metric: Metric) {
        match self.tx.try_send(metric) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(operation = "record_metric", "metric writer backlog full, dropping metric");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(operation = "record_metric", "metric writer closed, dropping metric");
            }
        }
    }
}

/// Writer batching config.
pub struct MetricWriterConfig {
    pub flush_rate: u64,
    pub flush_interval_secs: u64,
}

/// Spawns the task that drains the channel into the repo.
/// Flushes when buffer len >= flush_rate, or every flush_interval_secs, or when the channel closes.
/// When every `ChannelSink` is dropped, this task flushes what remains and exits.
pub fn spawn_metric_writer(
    mut rx: mpsc::Receiver<Metric>,
    repo: Arc<MetricRepo>,
    config: MetricWriterConfig,
    metrics_saved_total: Arc<AtomicU64>,
) -> tokio::task::JoinHandle<()> {
    let flush_interval = Duration::from_secs(config.flush_interval_secs);
    tokio::spawn(async move {
        let mut buffer: Vec<Metric> = Vec::new();
        let mut flush_tick = interval(flush_interval);
        flush_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Some(metric) => {
                            buffer.push(metric);
                            if buffer.len() >= config.flush_rate as usize
                                && let Err(e) = flush_buffer(&repo, &mut buffer, &metrics_saved_total).await
                            {
                                tracing::warn!(error = %e, "metric writer: save_metrics failed");
                            }
                        }
                        None => break,
                    }
                }
                _ = flush_tick.tick() => {
                    if let Err(e) = flush_buffer(&repo, &mut buffer, &metrics_saved_total).await {
                        tracing::warn!(error = %e, "metric writer: save_metrics failed");
                    }
                }
            }
        }
        if let Err(e) = flush_buffer(&repo, &mut buffer, &metrics_saved_total).await {
            tracing::warn!(error = %e, "metric writer: final flush failed");
        }
        tracing::debug!("Metric writer shutting down");
    })
}

// A failed batch is dropped rather than retried.
async fn flush_buffer(
    repo: &MetricRepo,
    buffer: &mut Vec<Metric>,
    metrics_saved_total: &AtomicU64,
) -> anyhow::Result<()> {
    if buffer.is_empty() {
        return Ok(());
    }
    let n = buffer.len();
    let result = repo.save_metrics(buffer).await;
    buffer.clear();
    result?;
    metrics_saved_total.fetch_add(n as u64, Ordering::Relaxed);
    tracing::debug!(operation = "save_metrics", metrics_count = n, "Metrics saved");
    Ok(())
}
