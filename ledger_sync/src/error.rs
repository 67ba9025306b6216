use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or persisting the ledger file.
///
/// These are fatal to a run: the store never silently writes a partial
/// or narrower file over existing data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on ledger file")]
    Io(#[from] std::io::Error),

    #[error("malformed ledger row")]
    Csv(#[from] csv::Error),

    /// A stored row is wider than the schema; truncating it would lose
    /// manually-entered data.
    #[error("ledger row {row} has {found} cells, schema allows {expected}")]
    RowTooWide {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors loading or validating the application configuration.
///
/// All of these surface before any network or ledger I/O happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
