use thiserror::Error;

/// Failures surfaced by a [`Transport`](crate::providers::woo_rest::Transport)
/// when fetching one page.
///
/// The split matters: `Timeout` and `Connect` are transient and worth a
/// retry with a longer timeout; everything else is permanent for that
/// page and must fail fast.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the per-attempt timeout.
    #[error("request timed out")]
    Timeout,

    /// Establishing the connection failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response body could not be decoded as the expected payload.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// Any other request failure.
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether a retry with an escalated timeout can plausibly help.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::Connect(_))
    }
}

/// Errors constructing a provider before any request is made.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// An environment variable required for authentication is not set.
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Reads an environment variable, returning a structured error if it's
/// missing.
pub fn required_env_var(name: &str) -> Result<String, ProviderInitError> {
    std::env::var(name).map_err(|_| ProviderInitError::MissingEnvVar(name.to_string()))
}
