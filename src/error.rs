// Errors for fundamental counter reads. Everything else degrades to null/empty instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("cpu counters unavailable: {0}")]
    Cpu(String),

    #[error("memory counters unavailable: {0}")]
    Memory(String),

    #[error("sampling task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}
