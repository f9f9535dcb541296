//! Prices, polymorphic over their pricing model.
//!
//! Every price carries a `model_type` discriminator and one model-specific
//! configuration object, e.g. `unit_config` for `"unit"` prices. The rest
//! of the fields are shared by all models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::discount::Discount;
use crate::error::DataError;
use crate::record::Validate;
use crate::variant::unrecognized;

/// Billing cadence of a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    OneTime,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    Custom,
    /// A cadence this client does not know. The raw value stays in the record.
    #[serde(other)]
    Unknown,
}

impl Validate for Cadence {
    fn validate(&self) -> Result<(), DataError> {
        Ok(())
    }
}

crate::record! {
    /// Configuration for `unit` prices: a flat amount per unit.
    pub struct UnitConfig {
        required unit_amount, set_unit_amount: Decimal = "unit_amount";
    }
}

crate::record! {
    /// Configuration for `package` prices: a flat amount per package of units.
    pub struct PackageConfig {
        required package_amount, set_package_amount: Decimal = "package_amount";
        required package_size, set_package_size: i64 = "package_size";
    }
}

crate::record! {
    /// One cell of a matrix price.
    pub struct MatrixValue {
        /// Values of each dimension, in the order of the config's `dimensions`.
        /// `None` matches any value.
        required dimension_values, set_dimension_values: Vec<Option<String>> = "dimension_values";
        required unit_amount, set_unit_amount: Decimal = "unit_amount";
    }
}

crate::record! {
    /// Configuration for `matrix` prices.
    pub struct MatrixConfig {
        required default_unit_amount, set_default_unit_amount: Decimal = "default_unit_amount";
        required dimensions, set_dimensions: Vec<Option<String>> = "dimensions";
        required matrix_values, set_matrix_values: Vec<MatrixValue> = "matrix_values";
    }
}

crate::record! {
    /// One tier of a tiered price.
    pub struct Tier {
        required first_unit, set_first_unit: f64 = "first_unit";
        optional last_unit, set_last_unit: f64 = "last_unit";
        required unit_amount, set_unit_amount: Decimal = "unit_amount";
    }
}

crate::record! {
    /// Configuration for `tiered` prices.
    pub struct TieredConfig {
        required tiers, set_tiers: Vec<Tier> = "tiers";
    }
}

crate::record! {
    /// One tier of a bulk price.
    pub struct BulkTier {
        optional maximum_units, set_maximum_units: f64 = "maximum_units";
        required unit_amount, set_unit_amount: Decimal = "unit_amount";
    }
}

crate::record! {
    /// Configuration for `bulk` prices.
    pub struct BulkConfig {
        required tiers, set_tiers: Vec<BulkTier> = "tiers";
    }
}

crate::record! {
    /// Configuration for `bps` (basis point) prices.
    pub struct BpsConfig {
        required bps, set_bps: f64 = "bps";
        optional per_unit_maximum, set_per_unit_maximum: Decimal = "per_unit_maximum";
    }
}

macro_rules! price_model {
    ($(#[$meta:meta])* $name:ident { $($config:tt)* }) => {
        crate::record! {
            $(#[$meta])*
            pub struct $name {
                optional id, set_id: String = "id";
                required model_type, set_model_type: String = "model_type";
                required name, set_name: String = "name";
                required item_id, set_item_id: String = "item_id";
                optional cadence, set_cadence: Cadence = "cadence";
                optional currency, set_currency: String = "currency";
                optional external_price_id, set_external_price_id: String = "external_price_id";
                optional fixed_price_quantity, set_fixed_price_quantity: f64 = "fixed_price_quantity";
                optional created_at, set_created_at: DateTime<Utc> = "created_at";
                optional metadata, set_metadata: HashMap<String, String> = "metadata";
                optional discount, set_discount: Discount = "discount";
                $($config)*
            }
        }
    };
}

price_model! {
    /// A price charging a flat amount per unit.
    UnitPrice {
        required unit_config, set_unit_config: UnitConfig = "unit_config";
    }
}

price_model! {
    /// A price charging per package of units.
    PackagePrice {
        required package_config, set_package_config: PackageConfig = "package_config";
    }
}

price_model! {
    /// A price whose unit amount depends on event dimensions.
    MatrixPrice {
        required matrix_config, set_matrix_config: MatrixConfig = "matrix_config";
    }
}

price_model! {
    /// A price charging each tier of usage at its own rate.
    TieredPrice {
        required tiered_config, set_tiered_config: TieredConfig = "tiered_config";
    }
}

price_model! {
    /// A price charging all usage at the rate of the tier it falls in.
    BulkPrice {
        required bulk_config, set_bulk_config: BulkConfig = "bulk_config";
    }
}

price_model! {
    /// A price charging basis points of an amount.
    BpsPrice {
        required bps_config, set_bps_config: BpsConfig = "bps_config";
    }
}

price_model! {
    /// A price keyed on total usage thresholds. The config is kept as raw JSON.
    ThresholdTotalAmountPrice {
        required threshold_total_amount_config, set_threshold_total_amount_config: Map<String, Value> = "threshold_total_amount_config";
    }
}

price_model! {
    /// A tiered price over packages of units. The config is kept as raw JSON.
    TieredPackagePrice {
        required tiered_package_config, set_tiered_package_config: Map<String, Value> = "tiered_package_config";
    }
}

crate::tagged_union! {
    /// A price, discriminated by `model_type`.
    ///
    /// Unrecognized pricing models decode to [`Price::Unknown`] and fail
    /// validation, so a listing containing new models still decodes.
    pub enum Price (discriminator = "model_type", visitor = PriceVisitor) {
        "unit" => Unit(UnitPrice), as_unit, visit_unit;
        "package" => Package(PackagePrice), as_package, visit_package;
        "matrix" => Matrix(MatrixPrice), as_matrix, visit_matrix;
        "tiered" => Tiered(TieredPrice), as_tiered, visit_tiered;
        "bulk" => Bulk(BulkPrice), as_bulk, visit_bulk;
        "bps" => Bps(BpsPrice), as_bps, visit_bps;
        "threshold_total_amount" => ThresholdTotalAmount(ThresholdTotalAmountPrice), as_threshold_total_amount, visit_threshold_total_amount;
        "tiered_package" => TieredPackage(TieredPackagePrice), as_tiered_package, visit_tiered_package;
    }
}

macro_rules! each_model {
    ($price:expr, $p:ident => $body:expr) => {
        match $price {
            Price::Unit($p) => $body,
            Price::Package($p) => $body,
            Price::Matrix($p) => $body,
            Price::Tiered($p) => $body,
            Price::Bulk($p) => $body,
            Price::Bps($p) => $body,
            Price::ThresholdTotalAmount($p) => $body,
            Price::TieredPackage($p) => $body,
            Price::Unknown(value) => Err(unrecognized::<Price>(value)),
        }
    };
}

impl Price {
    /// The price id, if the server has assigned one.
    pub fn id(&self) -> Result<Option<String>, DataError> {
        each_model!(self, p => p.id())
    }

    /// The display name, whatever the pricing model.
    pub fn name(&self) -> Result<String, DataError> {
        each_model!(self, p => p.name())
    }

    /// The billed item, whatever the pricing model.
    pub fn item_id(&self) -> Result<String, DataError> {
        each_model!(self, p => p.item_id())
    }

    /// The currency, whatever the pricing model.
    pub fn currency(&self) -> Result<Option<String>, DataError> {
        each_model!(self, p => p.currency())
    }
}
