//! API key type.

use std::fmt;

use crate::error::{Error, InvalidInputError};

/// A secret API key, sent as a bearer token.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create an API key, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::ApiKey`] if the key is empty or contains
    /// characters that cannot appear in an HTTP header.
    pub fn new(key: impl AsRef<str>) -> Result<Self, Error> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return Err(InvalidInputError::ApiKey {
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if !key.chars().all(|c| c.is_ascii_graphic()) {
            return Err(InvalidInputError::ApiKey {
                reason: "must be printable ASCII without spaces".to_string(),
            }
            .into());
        }
        Ok(Self(key.to_string()))
    }

    /// Returns the key for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or writing
    /// the local config file.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Hide key value in Debug output
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}
