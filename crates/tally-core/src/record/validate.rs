//! Deep structural validation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::DataError;

/// A value whose structure can be checked after decoding.
///
/// Records validate by reading every declared field, which surfaces
/// missing or malformed fields, and by recursing into nested records and
/// unions. Leaf types are always valid once deserialized.
pub trait Validate {
    /// Check the value, returning the first problem found.
    fn validate(&self) -> Result<(), DataError>;
}

macro_rules! always_valid {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Validate for $ty {
                fn validate(&self) -> Result<(), DataError> {
                    Ok(())
                }
            }
        )*
    };
}

always_valid!(
    String,
    bool,
    i32,
    i64,
    u32,
    u64,
    f64,
    Decimal,
    DateTime<Utc>,
    Value,
    Map<String, Value>,
);

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), DataError> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), DataError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for HashMap<String, T> {
    fn validate(&self) -> Result<(), DataError> {
        self.values().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for BTreeMap<String, T> {
    fn validate(&self) -> Result<(), DataError> {
        self.values().try_for_each(Validate::validate)
    }
}
