//! Error types shared across the crate
//!
//! Each concern gets its own enum. Network failures live in [`crate::ask`]
//! next to the client that produces them.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the session configuration, caught before any resident is
/// generated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("vocabulary table `{table}` is empty")]
    EmptyVocabulary { table: &'static str },

    #[error("resident count must be positive")]
    NonPositiveCount,

    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Aggregation over a collection that has nothing to average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("cannot aggregate an empty dataset")]
    EmptyDataset,
}
