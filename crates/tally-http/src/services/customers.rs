//! Customer endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use tally_core::pagination::{CursorParams, ListResponse, Page, PageSource};
use tally_core::traits::ApiRequest;
use tally_core::{Customer, CustomerCreateParams, CustomerListParams, Result, Validate};

use super::resource_path;
use crate::client::Client;

/// Endpoints under `/customers`.
#[derive(Debug, Clone)]
pub struct CustomersService {
    client: Client,
}

impl CustomersService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List customers, starting from the page `params` selects.
    #[instrument(skip(self, params, cancel))]
    pub async fn list(
        &self,
        params: CustomerListParams,
        cancel: &CancellationToken,
    ) -> Result<Page<CustomerListParams, Customer>> {
        debug!("Listing customers");
        Page::first(Arc::new(self.clone()), params, cancel).await
    }

    /// Fetch one customer.
    #[instrument(skip(self, cancel))]
    pub async fn get(&self, customer_id: &str, cancel: &CancellationToken) -> Result<Customer> {
        let path = resource_path("customers", "customer", customer_id)?;
        self.client.execute_json(ApiRequest::get(path), cancel).await
    }

    /// Create a customer.
    #[instrument(skip(self, params, cancel))]
    pub async fn create(
        &self,
        params: &CustomerCreateParams,
        cancel: &CancellationToken,
    ) -> Result<Customer> {
        params.validate()?;
        let request = ApiRequest::post("customers").with_json(serde_json::to_value(params)?);
        self.client.execute_json(request, cancel).await
    }

    /// Delete a customer.
    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, customer_id: &str, cancel: &CancellationToken) -> Result<()> {
        let path = resource_path("customers", "customer", customer_id)?;
        self.client.execute(ApiRequest::delete(path), cancel).await?;
        debug!("Customer deleted");
        Ok(())
    }
}

#[async_trait]
impl PageSource<CustomerListParams, Customer> for CustomersService {
    async fn fetch_page(
        &self,
        params: &CustomerListParams,
        cancel: &CancellationToken,
    ) -> Result<ListResponse<Customer>> {
        let request = ApiRequest::get("customers").with_query(params.to_query());
        self.client.execute_json(request, cancel).await
    }
}
