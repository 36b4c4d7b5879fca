use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use sysmetrics::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let metric_repo = Arc::new(
        metric_repo::MetricRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
        )
        .await?,
    );
    metric_repo.init().await?;

    let metrics_saved_total = Arc::new(AtomicU64::new(0));
    let (metric_tx, metric_rx) = tokio::sync::mpsc::channel(app_config.sampling.sink_capacity);
    let writer_handle = metric_writer::spawn_metric_writer(
        metric_rx,
        metric_repo,
        metric_writer::MetricWriterConfig {
            flush_rate: app_config.database.flush_rate,
            flush_interval_secs: app_config.database.flush_interval_secs,
        },
        metrics_saved_total.clone(),
    );

    let source: Arc<dyn sysinfo_repo::CounterSource> = Arc::new(sysinfo_repo::SysinfoRepo::new());
    let assembler = assembler::SnapshotAssembler::new(
        source.clone(),
        Arc::new(core_history::CoreHistory::new()),
        Arc::new(metric_writer::ChannelSink::new(metric_tx)),
        Arc::new(assembler::SystemClock),
        app_config.sampling.cpu_window(),
    );

    let app = routes::app(assembler, source, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        cpu_window_ms = app_config.sampling.cpu_window_ms,
        database = %app_config.database.path,
        "Listening on http://{}",
        addr
    );

    // The router owns the only metric sender; once serve returns it is dropped
    // and the writer flushes whatever is still buffered.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    let _ = writer_handle.await;
    tracing::info!(
        metrics_saved_total = metrics_saved_total.load(std::sync::atomic::Ordering::Relaxed),
        "shut down"
    );

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received shutdown signal");
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
