// Metric writer tests: ChannelSink -> writer task -> SQLite, batching and shutdown flush

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use sysmetrics::metric_repo::MetricRepo;
use sysmetrics::metric_writer::{ChannelSink, MetricSink, MetricWriterConfig, spawn_metric_writer};
use sysmetrics::models::Metric;
use tempfile::TempDir;

fn metric(i: i64) -> Metric {
    Metric {
        timestamp: Utc.timestamp_opt(1_700_000_000 + i, 0).unwrap(),
        cpu_percent: i as f64,
        ram_percent: 50.0,
        battery_percent: None,
    }
}

async fn open_repo(dir: &TempDir) -> Arc<MetricRepo> {
    let path = dir.path().join("metrics.db");
    let repo = MetricRepo::connect(path.to_str().unwrap(), 2).await.unwrap();
    repo.init().await.unwrap();
    Arc::new(repo)
}

#[tokio::test]
async fn writer_flushes_remaining_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir).await;
    let saved = Arc::new(AtomicU64::new(0));

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let handle = spawn_metric_writer(
        rx,
        repo.clone(),
        MetricWriterConfig {
            flush_rate: 100,
            flush_interval_secs: 3600,
        },
        saved.clone(),
    );

    let sink = ChannelSink::new(tx);
    for i in 0..3 {
        sink.record(metric(i));
    }
    drop(sink);

    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("writer should exit once the sink is dropped")
        .unwrap();

    assert_eq!(repo.count().await.unwrap(), 3);
    assert_eq!(saved.load(Ordering::Relaxed), 3);
    let recent = repo.recent(10).await.unwrap();
    let cpu: Vec<f64> = recent.iter().map(|m| m.cpu_percent).collect();
    assert_eq!(cpu, vec![0.0, 1.0, 2.0]);
}

#[tokio::test]
async fn writer_flushes_when_batch_is_full() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir).await;
    let saved = Arc::new(AtomicU64::new(0));

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let handle = spawn_metric_writer(
        rx,
        repo.clone(),
        MetricWriterConfig {
            flush_rate: 2,
            flush_interval_secs: 3600,
        },
        saved.clone(),
    );

    let sink = ChannelSink::new(tx);
    sink.record(metric(0));
    sink.record(metric(1));

    // Batch of two is written without waiting for the interval or shutdown
    let mut flushed = false;
    for _ in 0..100 {
        if saved.load(Ordering::Relaxed) == 2 {
            flushed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(flushed, "batch of flush_rate metrics should be saved");

    sink.record(metric(2));
    drop(sink);
    handle.await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 3);
    assert_eq!(saved.load(Ordering::Relaxed), 3);
}

#[tokio::test]
async fn channel_sink_drops_when_backlog_full() {
    let (tx, mut rx) = tokio::sync::mpsc::channel(1);
    let sink = ChannelSink::new(tx);
    sink.record(metric(0));
    sink.record(metric(1));
    drop(sink);

    let first = rx.recv().await.expect("first metric queued");
    assert_eq!(first.cpu_percent, 0.0);
    assert!(rx.recv().await.is_none());
}
