// SQLite store for headline metrics. Rows are insert-only.

use crate::models::Metric;
use chrono::DateTime;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

pub struct MetricRepo {
    pool: SqlitePool,
}

impl MetricRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                cpu_percent REAL NOT NULL,
                ram_percent REAL NOT NULL,
                battery_percent REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_metrics_created_at ON metrics(created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, metrics), fields(repo = "metrics", operation = "save_metrics", metrics_count = metrics.len()))]
    pub async fn save_metrics(&self, metrics: &[Metric]) -> anyhow::Result<()> {
        if metrics.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for m in metrics {
            sqlx::query(
                "INSERT INTO metrics (created_at, cpu_percent, ram_percent, battery_percent) VALUES ($1, $2, $3, $4)",
            )
            .bind(m.timestamp.timestamp_millis())
            .bind(m.cpu_percent)
            .bind(m.ram_percent)
            .bind(m.battery_percent)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Most recent `limit` metrics, oldest first.
    pub async fn recent(&self, limit: u32) -> anyhow::Result<Vec<Metric>> {
        let rows = sqlx::query(
            "SELECT created_at, cpu_percent, ram_percent, battery_percent
             FROM metrics ORDER BY id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_metric_row(&row)?);
        }
        out.reverse();
        Ok(out)
    }

    pub async fn count(&self) -> anyhow::Result<u64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM metrics")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    fn parse_metric_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Metric> {
        let created_at: i64 = row.try_get("created_at")?;
        let timestamp = DateTime::from_timestamp_millis(created_at)
            .ok_or_else(|| anyhow::anyhow!("metric created_at out of range: {}", created_at))?;
        Ok(Metric {
            timestamp,
            cpu_percent: row.try_get("cpu_percent")?,
            ram_percent: row.try_get("ram_percent")?,
            battery_percent: row.try_get("battery_percent")?,
        })
    }
}
