//! tally-core - Records, variant codec and pagination for the tally billing
//! API client.
//!
//! Every API object is a record over an ordered map of raw JSON, so fields
//! this client does not model survive a decode, edit, encode round trip.
//! Polymorphic objects such as [`Price`] are unions discriminated by a
//! field like `model_type`; list endpoints return a [`Page`] that can fetch
//! the next page from its cursor.
//!
//! This crate has no HTTP client. The [`Transport`] trait is the seam that
//! `tally-http` implements.

pub mod error;
pub mod models;
pub mod pagination;
pub mod record;
pub mod traits;
pub mod types;
pub mod variant;

pub use error::{ApiError, DataError, Error, InvalidInputError, TransportError};
pub use models::{
    Customer, CustomerCreateParams, CustomerListParams, Discount, Price, PriceListParams,
};
pub use pagination::{CursorParams, ListResponse, Page, PageSource, PaginationMetadata};
pub use record::{Decode, RawRecord, Record, Validate};
pub use traits::{ApiRequest, ApiResponse, Method, Transport};
pub use types::{ApiKey, BaseUrl};
pub use variant::Union;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}
