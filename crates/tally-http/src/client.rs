//! Configured API client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use tally_core::error::InvalidInputError;
use tally_core::traits::{ApiRequest, ApiResponse, Transport};
use tally_core::{ApiKey, BaseUrl, Error, Result};

use crate::services::{CustomersService, PricesService};
use crate::transport::ReqwestTransport;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.withorb.com/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "TALLY_API_KEY";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "TALLY_BASE_URL";

/// Settings for a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API base URL.
    pub base_url: BaseUrl,
    /// Key sent as a bearer token. Requests fail without one.
    pub api_key: Option<ApiKey>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::new(DEFAULT_BASE_URL).expect("default base URL is valid"),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Defaults overridden by `TALLY_API_KEY` and `TALLY_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            options.base_url = BaseUrl::new(url)?;
        }
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            options.api_key = Some(ApiKey::new(key)?);
        }
        Ok(options)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the billing API.
///
/// Cheap to clone; clones share the transport.
///
/// # Example
///
/// ```no_run
/// use tally_core::PriceListParams;
/// use tally_http::{Client, ClientOptions};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> tally_core::Result<()> {
/// let client = Client::new(ClientOptions::from_env()?)?;
/// let cancel = CancellationToken::new();
///
/// let mut page = client.prices().list(PriceListParams::new(), &cancel).await?;
/// loop {
///     for price in page.items() {
///         println!("{}", price.name()?);
///     }
///     if !page.has_next() {
///         break;
///     }
///     page = page.next(&cancel).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    options: ClientOptions,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client sending requests over HTTP.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(options.base_url.clone(), options.timeout)?;
        Ok(Self::with_transport(options, Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner { options, transport }),
        }
    }

    /// Create a new client with modified options.
    ///
    /// The transport is shared unless the base URL or timeout changed, in
    /// which case a new HTTP transport is built. This client is unaffected.
    pub fn with_options(&self, modify: impl FnOnce(&mut ClientOptions)) -> Result<Self> {
        let mut options = self.inner.options.clone();
        modify(&mut options);

        let current = &self.inner.options;
        if options.base_url == current.base_url && options.timeout == current.timeout {
            Ok(Self::with_transport(
                options,
                Arc::clone(&self.inner.transport),
            ))
        } else {
            Self::new(options)
        }
    }

    /// Returns the options this client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Price endpoints.
    pub fn prices(&self) -> PricesService {
        PricesService::new(self.clone())
    }

    /// Customer endpoints.
    pub fn customers(&self) -> CustomersService {
        CustomersService::new(self.clone())
    }

    /// Send an authenticated request.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if no API key is configured
    /// - [`Error::Api`] for non-success statuses
    /// - whatever the transport returns
    #[instrument(skip(self, request, cancel), fields(method = %request.method, path = %request.path))]
    pub async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let key = self
            .inner
            .options
            .api_key
            .clone()
            .ok_or_else(|| InvalidInputError::ApiKey {
                reason: format!("no API key configured (set {ENV_API_KEY})"),
            })?;

        let request = request.with_bearer(key);
        let response = self.inner.transport.execute(&request, cancel).await?;

        if response.is_success() {
            debug!(status = response.status, "Request succeeded");
            Ok(response)
        } else {
            let error = response.api_error();
            warn!(status = error.status, title = ?error.title, "API returned an error");
            Err(Error::Api(error))
        }
    }

    /// Send an authenticated request and decode the JSON response.
    pub async fn execute_json<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<R> {
        self.execute(request, cancel).await?.json()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
