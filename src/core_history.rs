// Rolling per-core CPU usage history, shared by every /metrics/ request in the process.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CollectError;

/// Points kept per core; older points are evicted from the front.
pub const HISTORY_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreHistoryPoint {
    #[serde(rename = "time")]
    pub timestamp: String,
    pub usage: f64,
}

/// Index = logical core. Width follows the most recent sample: a change in core
/// count discards the history of every core, not only the added/removed ones.
#[derive(Debug, Default)]
pub struct CoreHistory {
    cores: Mutex<Vec<VecDeque<CoreHistoryPoint>>>,
}

impl CoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, per_core: &[f64], timestamp: DateTime<Utc>) -> Result<(), CollectError> {
        let mut cores = self.lock()?;
        push_sample(&mut cores, per_core, timestamp);
        Ok(())
    }

    /// Record and read back under one lock, so the caller sees its own sample and
    /// never an interleaving with another request.
    ///
    /// `now` is called while the lock is held: appends are stamped in the order
    /// they land, so every core's timestamps stay non-decreasing. Returns the stamp.
    pub fn record_and_snapshot(
        &self,
        per_core: &[f64],
        now: impl FnOnce() -> DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, Vec<Vec<CoreHistoryPoint>>), CollectError> {
        let mut cores = self.lock()?;
        let timestamp = now();
        push_sample(&mut cores, per_core, timestamp);
        Ok((timestamp, copy_out(&cores)))
    }

    pub fn snapshot(&self) -> Result<Vec<Vec<CoreHistoryPoint>>, CollectError> {
        let cores = self.lock()?;
        Ok(copy_out(&cores))
    }

    pub fn width(&self) -> Result<usize, CollectError> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<VecDeque<CoreHistoryPoint>>>, CollectError> {
        self.cores
            .lock()
            .map_err(|_| CollectError::LockPoisoned("core history"))
    }
}

fn push_sample(
    cores: &mut Vec<VecDeque<CoreHistoryPoint>>,
    per_core: &[f64],
    timestamp: DateTime<Utc>,
) {
    if cores.len() != per_core.len() {
        if !cores.is_empty() {
            tracing::info!(
                previous = cores.len(),
                current = per_core.len(),
                "logical core count changed, resetting per-core history"
            );
        }
        *cores = (0..per_core.len())
            .map(|_| VecDeque::with_capacity(HISTORY_LEN))
            .collect();
    }

    let time = timestamp.to_rfc3339_opts(SecondsFormat::Micros, false);
    for (core, &usage) in cores.iter_mut().zip(per_core) {
        core.push_back(CoreHistoryPoint {
            timestamp: time.clone(),
            usage,
        });
        while core.len() > HISTORY_LEN {
            core.pop_front();
        }
    }
}

fn copy_out(cores: &[VecDeque<CoreHistoryPoint>]) -> Vec<Vec<CoreHistoryPoint>> {
    cores.iter().map(|c| c.iter().cloned().collect()).collect()
}
