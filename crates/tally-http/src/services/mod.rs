//! Resource services.

mod customers;
mod prices;

pub use customers::CustomersService;
pub use prices::PricesService;

use tally_core::Result;
use tally_core::error::InvalidInputError;

/// Build `collection/id`, refusing ids that would change the path.
pub(crate) fn resource_path(collection: &'static str, resource: &'static str, id: &str) -> Result<String> {
    let reason = if id.is_empty() {
        Some("must not be empty")
    } else if id.contains(['/', '?', '#']) {
        Some("must not contain '/', '?' or '#'")
    } else if id == "." || id == ".." {
        Some("must not be a relative path segment")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InvalidInputError::ResourceId {
            resource,
            value: id.to_string(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(format!("{collection}/{id}")),
    }
}
