//! Validated configuration types.
//!
//! These types check their input at construction time, so a client can
//! never be configured with a malformed base URL or an empty key.

mod api_key;
mod base_url;

pub use api_key::ApiKey;
pub use base_url::BaseUrl;
