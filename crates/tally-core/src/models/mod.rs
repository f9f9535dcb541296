//! API models.
//!
//! Every model is a record over the raw JSON it was decoded from, so
//! fields this client does not know about are written back unchanged.

mod customer;
mod discount;
mod params;
mod price;

pub use customer::{Customer, CustomerCreateParams};
pub use discount::{
    AmountDiscount, Discount, DiscountVisitor, PercentageDiscount, TrialDiscount, UsageDiscount,
};
pub use params::{CustomerListParams, PriceListParams, TimeRange};
pub use price::{
    BpsConfig, BpsPrice, BulkConfig, BulkPrice, BulkTier, Cadence, MatrixConfig, MatrixPrice,
    MatrixValue, PackageConfig, PackagePrice, Price, PriceVisitor, ThresholdTotalAmountPrice,
    Tier, TieredConfig, TieredPackagePrice, TieredPrice, UnitConfig, UnitPrice,
};
