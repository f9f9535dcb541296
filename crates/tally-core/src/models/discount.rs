//! Discounts, discriminated by `discount_type`.

use rust_decimal::Decimal;

use crate::error::DataError;
use crate::variant::unrecognized;

crate::record! {
    /// A percentage off the matching prices.
    pub struct PercentageDiscount {
        required discount_type, set_discount_type: String = "discount_type";
        required applies_to_price_ids, set_applies_to_price_ids: Vec<String> = "applies_to_price_ids";
        /// Fraction between 0 and 1.
        required percentage_discount, set_percentage_discount: f64 = "percentage_discount";
        optional reason, set_reason: String = "reason";
    }
}

crate::record! {
    /// A free trial on the matching prices.
    pub struct TrialDiscount {
        required discount_type, set_discount_type: String = "discount_type";
        required applies_to_price_ids, set_applies_to_price_ids: Vec<String> = "applies_to_price_ids";
        optional trial_amount_discount, set_trial_amount_discount: Decimal = "trial_amount_discount";
        optional trial_percentage_discount, set_trial_percentage_discount: f64 = "trial_percentage_discount";
        optional reason, set_reason: String = "reason";
    }
}

crate::record! {
    /// A number of free usage units on the matching prices.
    pub struct UsageDiscount {
        required discount_type, set_discount_type: String = "discount_type";
        required applies_to_price_ids, set_applies_to_price_ids: Vec<String> = "applies_to_price_ids";
        required usage_discount, set_usage_discount: f64 = "usage_discount";
        optional reason, set_reason: String = "reason";
    }
}

crate::record! {
    /// A fixed amount off the matching prices.
    pub struct AmountDiscount {
        required discount_type, set_discount_type: String = "discount_type";
        required applies_to_price_ids, set_applies_to_price_ids: Vec<String> = "applies_to_price_ids";
        required amount_discount, set_amount_discount: Decimal = "amount_discount";
        optional reason, set_reason: String = "reason";
    }
}

crate::tagged_union! {
    /// A discount attached to a price or an adjustment.
    pub enum Discount (discriminator = "discount_type", visitor = DiscountVisitor) {
        "percentage" => Percentage(PercentageDiscount), as_percentage, visit_percentage;
        "trial" => Trial(TrialDiscount), as_trial, visit_trial;
        "usage" => Usage(UsageDiscount), as_usage, visit_usage;
        "amount" => Amount(AmountDiscount), as_amount, visit_amount;
    }
}

impl Discount {
    /// The prices this discount applies to.
    pub fn applies_to_price_ids(&self) -> Result<Vec<String>, DataError> {
        match self {
            Discount::Percentage(d) => d.applies_to_price_ids(),
            Discount::Trial(d) => d.applies_to_price_ids(),
            Discount::Usage(d) => d.applies_to_price_ids(),
            Discount::Amount(d) => d.applies_to_price_ids(),
            Discount::Unknown(value) => Err(unrecognized::<Discount>(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;
    use crate::record::Validate;
    use serde_json::{Value, json};

    fn samples() -> Vec<Value> {
        vec![
            json!({"discount_type": "percentage", "applies_to_price_ids": ["p1"], "percentage_discount": 0.15}),
            json!({"discount_type": "trial", "applies_to_price_ids": ["p1", "p2"], "trial_amount_discount": "5.00", "reason": null}),
            json!({"discount_type": "usage", "applies_to_price_ids": [], "usage_discount": 100.0}),
            json!({"discount_type": "amount", "applies_to_price_ids": ["p3"], "amount_discount": "12.50", "reason": "loyalty"}),
        ]
    }

    #[test]
    fn every_discount_type_round_trips() {
        for sample in samples() {
            let discount = Discount::decode(sample.clone()).unwrap();
            assert!(!discount.is_unknown());
            assert_eq!(discount.discriminator(), sample["discount_type"].as_str());
            assert!(discount.validate().is_ok());
            assert_eq!(serde_json::to_value(&discount).unwrap(), sample);
        }
    }

    #[test]
    fn cross_branch_price_ids() {
        let discount = Discount::decode(samples()[1].clone()).unwrap();
        assert_eq!(discount.applies_to_price_ids().unwrap(), ["p1", "p2"]);
    }

    #[test]
    fn amount_keeps_decimal_scale() {
        let discount = Discount::decode(samples()[3].clone()).unwrap();
        let amount = discount.as_amount().unwrap().amount_discount().unwrap();
        assert_eq!(amount.to_string(), "12.50");
    }

    #[test]
    fn unknown_discount_inside_price_is_caught_by_validate() {
        let price = Price::decode(json!({
            "model_type": "unit",
            "name": "Compute",
            "item_id": "it_1",
            "unit_config": {"unit_amount": "1.00"},
            "discount": {"discount_type": "coupon_v2", "code": "SAVE"}
        }));

        // The price branch validates its discount, which is unrecognized.
        let err = price.unwrap_err();
        match err {
            DataError::VariantDecode { variant, source, .. } => {
                assert_eq!(variant, "unit");
                assert!(matches!(
                    *source,
                    DataError::UnrecognizedVariant { union: "Discount", .. }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn broken_discount_names_the_field() {
        let err = Discount::decode(json!({"discount_type": "usage", "applies_to_price_ids": []}))
            .unwrap_err();
        assert_eq!(err.field(), Some("usage_discount"));
    }
}
