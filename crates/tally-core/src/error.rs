//! Error types for the tally client.
//!
//! This module provides a unified error type with explicit variants for
//! data (decode/validation), transport, API, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for tally operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// A payload did not have the shape its model declares.
    #[error("invalid data: {0}")]
    Data(#[from] DataError),

    /// The caller asked for something the current state cannot provide.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Network transport errors (connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The API answered with a non-success status.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A response body was not valid JSON for the expected type.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input validation errors (base URL, API key, resource ids).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The cancellation token fired before the request completed.
    #[error("request cancelled")]
    Cancelled,
}

/// Errors raised while reading typed fields out of raw records or
/// decoding polymorphic payloads.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required field is absent from the record.
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: String },

    /// A non-nullable field is present but `null`.
    #[error("field '{field}' cannot be null")]
    UnexpectedNull { field: String },

    /// A field is present but does not deserialize into its declared type.
    #[error("field '{field}' has an invalid value: {source}")]
    InvalidField {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value that must be a JSON object was something else.
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// A value could not be serialized into a record field.
    #[error("field '{field}' could not be serialized: {source}")]
    Unserializable {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// A union's discriminator was absent, not a string, or unknown.
    #[error("{union} did not match any known variant{}", describe_discriminator(.discriminator))]
    UnrecognizedVariant {
        union: &'static str,
        discriminator: Option<String>,
    },

    /// A union branch holds a record whose discriminator names another
    /// branch, or none.
    #[error("field '{field}' should be '{expected}'{}", describe_found(.found))]
    DiscriminatorMismatch {
        field: String,
        expected: &'static str,
        found: Option<String>,
    },

    /// The discriminator selected a variant, but the payload is not a valid
    /// instance of it.
    #[error("failed to decode {union} as '{variant}': {source}")]
    VariantDecode {
        union: &'static str,
        variant: &'static str,
        #[source]
        source: Box<DataError>,
    },
}

fn describe_discriminator(discriminator: &Option<String>) -> String {
    match discriminator {
        Some(tag) => format!(" (discriminator '{tag}')"),
        None => " (no discriminator)".to_string(),
    }
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(tag) => format!(", found '{tag}'"),
        None => ", found nothing".to_string(),
    }
}

impl DataError {
    /// Returns the field name this error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            DataError::MissingRequiredField { field }
            | DataError::UnexpectedNull { field }
            | DataError::InvalidField { field, .. }
            | DataError::Unserializable { field, .. }
            | DataError::DiscriminatorMismatch { field, .. } => Some(field),
            DataError::VariantDecode { source, .. } => source.field(),
            DataError::NotAnObject { .. } | DataError::UnrecognizedVariant { .. } => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success response from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Error type URI (if present).
    pub error_type: Option<String>,
    /// Short summary from the server.
    pub title: Option<String>,
    /// Longer explanation from the server.
    pub detail: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref title) = self.title {
            write!(f, " [{}]", title)?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(
        status: u16,
        error_type: Option<String>,
        title: Option<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            status,
            error_type,
            title,
            detail,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Check if the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Missing or malformed API key.
    #[error("invalid API key: {reason}")]
    ApiKey { reason: String },

    /// A resource id that cannot be placed in a URL path.
    #[error("invalid {resource} id '{value}': {reason}")]
    ResourceId {
        resource: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_variant_names_discriminator() {
        let err = DataError::UnrecognizedVariant {
            union: "Price",
            discriminator: Some("zzz_not_real".into()),
        };
        assert_eq!(
            err.to_string(),
            "Price did not match any known variant (discriminator 'zzz_not_real')"
        );

        let err = DataError::UnrecognizedVariant {
            union: "Price",
            discriminator: None,
        };
        assert!(err.to_string().ends_with("(no discriminator)"));
    }

    #[test]
    fn variant_decode_carries_nested_field() {
        let err = DataError::VariantDecode {
            union: "Price",
            variant: "unit",
            source: Box::new(DataError::MissingRequiredField {
                field: "unit_config".into(),
            }),
        };
        assert_eq!(err.field(), Some("unit_config"));
        assert!(err.to_string().contains("'unit'"));
        assert!(err.to_string().contains("unit_config"));
    }

    #[test]
    fn api_error_display() {
        let err = ApiError::new(
            404,
            None,
            Some("Resource not found".into()),
            Some("price abc does not exist".into()),
        );
        assert_eq!(
            err.to_string(),
            "HTTP 404 [Resource not found]: price abc does not exist"
        );
        assert!(err.is_not_found());
        assert!(!err.is_auth_error());
    }
}
