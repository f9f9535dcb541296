//! Customers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

crate::record! {
    /// A customer as returned by the API.
    pub struct Customer {
        required id, set_id: String = "id";
        required name, set_name: String = "name";
        required email, set_email: String = "email";
        nullable external_customer_id, set_external_customer_id: String = "external_customer_id";
        nullable currency, set_currency: String = "currency";
        optional timezone, set_timezone: String = "timezone";
        /// Outstanding balance in the customer's currency.
        optional balance, set_balance: Decimal = "balance";
        optional created_at, set_created_at: DateTime<Utc> = "created_at";
        optional metadata, set_metadata: HashMap<String, String> = "metadata";
    }
}

crate::record! {
    /// Body of a create-customer request.
    pub struct CustomerCreateParams {
        required name, set_name: String = "name";
        required email, set_email: String = "email";
        optional external_customer_id, set_external_customer_id: String = "external_customer_id";
        optional currency, set_currency: String = "currency";
        optional timezone, set_timezone: String = "timezone";
        optional metadata, set_metadata: HashMap<String, String> = "metadata";
    }
}
