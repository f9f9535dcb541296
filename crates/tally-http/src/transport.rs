//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use tally_core::error::TransportError;
use tally_core::traits::{ApiRequest, ApiResponse, Method, Transport};
use tally_core::{BaseUrl, Error, Result};

const USER_AGENT: &str = concat!("tally/", env!("CARGO_PKG_VERSION"));

/// HTTP transport sending requests below a base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: BaseUrl,
}

impl ReqwestTransport {
    /// Create a transport for the given base URL.
    ///
    /// `timeout` bounds each request from connect to the end of the body.
    pub fn new(base_url: BaseUrl, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self { client, base_url })
    }

    /// Returns the base URL this transport sends to.
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.base_url.endpoint(&request.path);
        debug!(%url, "Sending request");
        trace!(query = ?request.query, "query parameters");

        let mut builder = self
            .client
            .request(reqwest_method(request.method), &url)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(key) = &request.bearer {
            builder = builder.bearer_auth(key.expose());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();
        trace!(status, bytes = body.len(), "Response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request, cancel), fields(method = %request.method, path = %request.path))]
    async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Request cancelled");
                Err(Error::Cancelled)
            }
            result = self.send(request) => result,
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        let base = BaseUrl::new("https://api.withorb.com/v1").unwrap();
        let transport = ReqwestTransport::new(base.clone(), Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), &base);
    }

    #[test]
    fn method_mapping() {
        assert_eq!(reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(reqwest_method(Method::Delete), reqwest::Method::DELETE);
    }

    #[tokio::test]
    async fn cancelled_before_send() {
        let base = BaseUrl::new("http://127.0.0.1:9").unwrap();
        let transport = ReqwestTransport::new(base, Duration::from_secs(5)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = transport
            .execute(&ApiRequest::get("prices"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
