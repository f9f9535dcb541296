//! Price endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use tally_core::pagination::{CursorParams, ListResponse, Page, PageSource};
use tally_core::traits::ApiRequest;
use tally_core::{Price, PriceListParams, Result, Validate};

use super::resource_path;
use crate::client::Client;

/// Endpoints under `/prices`.
#[derive(Debug, Clone)]
pub struct PricesService {
    client: Client,
}

impl PricesService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List prices, starting from the page `params` selects.
    #[instrument(skip(self, params, cancel))]
    pub async fn list(
        &self,
        params: PriceListParams,
        cancel: &CancellationToken,
    ) -> Result<Page<PriceListParams, Price>> {
        debug!("Listing prices");
        Page::first(Arc::new(self.clone()), params, cancel).await
    }

    /// Fetch one price.
    ///
    /// Prices with an unrecognized `model_type` come back as
    /// [`Price::Unknown`] rather than failing.
    #[instrument(skip(self, cancel))]
    pub async fn get(&self, price_id: &str, cancel: &CancellationToken) -> Result<Price> {
        debug!("Fetching price");
        let path = resource_path("prices", "price", price_id)?;
        let value: Value = self.client.execute_json(ApiRequest::get(path), cancel).await?;
        Ok(Price::decode(value)?)
    }

    /// Create a price.
    ///
    /// The price is validated first; an unknown pricing model is refused
    /// without a request.
    #[instrument(skip(self, price, cancel), fields(model_type = ?price.discriminator()))]
    pub async fn create(&self, price: &Price, cancel: &CancellationToken) -> Result<Price> {
        price.validate()?;
        let body = serde_json::to_value(price)?;
        let value: Value = self
            .client
            .execute_json(ApiRequest::post("prices").with_json(body), cancel)
            .await?;
        Ok(Price::decode(value)?)
    }
}

#[async_trait]
impl PageSource<PriceListParams, Price> for PricesService {
    async fn fetch_page(
        &self,
        params: &PriceListParams,
        cancel: &CancellationToken,
    ) -> Result<ListResponse<Price>> {
        let request = ApiRequest::get("prices").with_query(params.to_query());
        self.client.execute_json(request, cancel).await
    }
}
