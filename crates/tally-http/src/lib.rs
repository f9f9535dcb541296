//! tally-http - HTTP client for the billing API.
//!
//! [`ReqwestTransport`] implements the core transport trait over reqwest,
//! and [`Client`] adds authentication, error mapping and the resource
//! services.

mod client;
mod services;
mod transport;

pub use client::{
    Client, ClientOptions, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ENV_API_KEY, ENV_BASE_URL,
};
pub use services::{CustomersService, PricesService};
pub use transport::ReqwestTransport;
