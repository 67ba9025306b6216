//! Transport seam between the retry loop and the wire.
//!
//! Building a client (amortized, once) is separated from issuing a
//! request with a timeout (per attempt), so the retry logic above this
//! seam can be driven against a fake transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::models::{order::RemoteOrderRecord, request_params::PageQuery};
use crate::providers::errors::{ProviderInitError, TransportError, required_env_var};

/// Environment variable holding the API consumer key.
pub const ENV_API_KEY: &str = "ORDER_API_KEY";
/// Environment variable holding the API consumer secret.
pub const ENV_API_SECRET: &str = "ORDER_API_SECRET";

const ORDERS_ROUTE: &str = "wp-json/wc/v3/orders";

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one page request with the given per-attempt timeout.
    async fn get_orders(
        &self,
        query: &PageQuery,
        timeout: Duration,
    ) -> Result<Vec<RemoteOrderRecord>, TransportError>;
}

/// HTTPS transport authenticated with basic-auth consumer credentials.
pub struct HttpTransport {
    client: Client,
    orders_url: String,
    key: SecretString,
    secret: SecretString,
}

impl HttpTransport {
    /// Creates a transport for `base_url`, reading credentials from the
    /// `ORDER_API_KEY` and `ORDER_API_SECRET` environment variables.
    pub fn from_env(base_url: &str) -> Result<Self, ProviderInitError> {
        let key = SecretString::new(required_env_var(ENV_API_KEY)?.into());
        let secret = SecretString::new(required_env_var(ENV_API_SECRET)?.into());

        let client = Client::builder().build()?;
        Ok(Self {
            client,
            orders_url: format!("{}/{}", base_url.trim_end_matches('/'), ORDERS_ROUTE),
            key,
            secret,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_orders(
        &self,
        query: &PageQuery,
        timeout: Duration,
    ) -> Result<Vec<RemoteOrderRecord>, TransportError> {
        let response = self
            .client
            .get(&self.orders_url)
            .basic_auth(self.key.expose_secret(), Some(self.secret.expose_secret()))
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<Vec<RemoteOrderRecord>>()
            .await
            .map_err(classify)
    }
}
