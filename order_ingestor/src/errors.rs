use thiserror::Error;

/// The unified error type for the `order_ingestor` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from an order source (e.g., provider setup).
    #[error("provider error: {0}")]
    Provider(String),

    /// An error related to configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
