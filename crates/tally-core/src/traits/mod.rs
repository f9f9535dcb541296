//! Core traits for talking to the API.

mod transport;

pub use transport::{ApiRequest, ApiResponse, Method, Transport};
