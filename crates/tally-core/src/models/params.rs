//! Query parameters of list endpoints.

use chrono::{DateTime, Utc};

use crate::pagination::CursorParams;

crate::record! {
    /// Bounds on a timestamp, rendered as `field[gte]=..` style query pairs.
    pub struct TimeRange {
        optional gt, set_gt: DateTime<Utc> = "gt";
        optional gte, set_gte: DateTime<Utc> = "gte";
        optional lt, set_lt: DateTime<Utc> = "lt";
        optional lte, set_lte: DateTime<Utc> = "lte";
    }
}

crate::record! {
    /// Parameters of `GET /prices`.
    pub struct PriceListParams {
        optional cursor, set_cursor: String = "cursor";
        /// Page size, between 1 and 100.
        optional limit, set_limit: i64 = "limit";
    }
}

impl CursorParams for PriceListParams {}

crate::record! {
    /// Parameters of `GET /customers`.
    pub struct CustomerListParams {
        optional cursor, set_cursor: String = "cursor";
        optional limit, set_limit: i64 = "limit";
        optional created_at, set_created_at: TimeRange = "created_at";
    }
}

impl CursorParams for CustomerListParams {}
