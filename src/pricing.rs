//! Server-side order pricing: subtotal, shipping, tax and total.
//!
//! Policies are read from configuration as JSON and never change after
//! startup. Every amount leaving this module is rounded half-up to cents.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::money::{self, round_money};

/// Largest order total that fits a `NUMERIC(10,2)` column.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// One bracket of a tiered shipping table.
///
/// Every bracket but the last carries a limit; the last one is the
/// catch-all marked with `"else": true`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bracket {
    #[serde(default, rename = "upTo", alias = "upToKg")]
    pub limit: Option<Decimal>,
    #[serde(default, rename = "else")]
    pub otherwise: bool,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ShippingPolicy {
    Flat {
        flat: Decimal,
    },
    Tiered {
        tiered: Vec<Bracket>,
    },
    FreeAbove {
        #[serde(rename = "freeAbove")]
        free_above: Decimal,
        #[serde(rename = "elseFlat")]
        else_flat: Decimal,
    },
    /// Brackets on total parcel weight in kilograms.
    WeightTiered {
        #[serde(rename = "weightTiered")]
        weight_tiered: Vec<Bracket>,
    },
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        ShippingPolicy::Flat {
            flat: Decimal::new(599, 2),
        }
    }
}

impl ShippingPolicy {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ShippingPolicy::Flat { flat } => non_negative("flat", *flat),
            ShippingPolicy::FreeAbove {
                free_above,
                else_flat,
            } => {
                non_negative("freeAbove", *free_above)?;
                non_negative("elseFlat", *else_flat)
            }
            ShippingPolicy::Tiered { tiered } => validate_brackets("tiered", tiered),
            ShippingPolicy::WeightTiered { weight_tiered } => {
                validate_brackets("weightTiered", weight_tiered)
            }
        }
    }

    /// Shipping for an order with the given subtotal and total weight.
    pub fn cost(&self, subtotal: Decimal, weight: Decimal) -> Decimal {
        let cost = match self {
            ShippingPolicy::Flat { flat } => *flat,
            ShippingPolicy::FreeAbove {
                free_above,
                else_flat,
            } => {
                if subtotal > *free_above {
                    Decimal::ZERO
                } else {
                    *else_flat
                }
            }
            ShippingPolicy::Tiered { tiered } => {
                pick_bracket(tiered, |limit| subtotal <= limit)
            }
            ShippingPolicy::WeightTiered { weight_tiered } => {
                pick_bracket(weight_tiered, |limit| weight < limit)
            }
        };
        round_money(cost)
    }
}

fn pick_bracket(brackets: &[Bracket], fits: impl Fn(Decimal) -> bool) -> Decimal {
    brackets
        .iter()
        .find(|bracket| bracket.otherwise || bracket.limit.is_some_and(&fits))
        .map(|bracket| bracket.amount)
        .unwrap_or(Decimal::ZERO)
}

fn validate_brackets(name: &str, brackets: &[Bracket]) -> Result<(), String> {
    let Some((last, rest)) = brackets.split_last() else {
        return Err(format!("{name} needs at least one bracket"));
    };
    if !last.otherwise {
        return Err(format!("{name} must end with an \"else\" bracket"));
    }

    let mut previous: Option<Decimal> = None;
    for bracket in rest {
        if bracket.otherwise {
            return Err(format!("{name} allows \"else\" only on the last bracket"));
        }
        let Some(limit) = bracket.limit else {
            return Err(format!("{name} bracket is missing its limit"));
        };
        if previous.is_some_and(|prev| limit <= prev) {
            return Err(format!("{name} limits must be strictly ascending"));
        }
        previous = Some(limit);
    }

    brackets
        .iter()
        .try_for_each(|bracket| non_negative(&format!("{name} amount"), bracket.amount))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TaxPolicy {
    Rate {
        rate: Decimal,
    },
    /// Rate looked up by the customer's two-letter state code.
    ByState {
        #[serde(rename = "byState")]
        by_state: BTreeMap<String, Decimal>,
        #[serde(default, rename = "else")]
        otherwise: Decimal,
    },
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy::Rate {
            rate: Decimal::ZERO,
        }
    }
}

impl TaxPolicy {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            TaxPolicy::Rate { rate } => fraction("rate", *rate),
            TaxPolicy::ByState {
                by_state,
                otherwise,
            } => {
                fraction("else", *otherwise)?;
                by_state
                    .iter()
                    .try_for_each(|(state, rate)| fraction(state, *rate))
            }
        }
    }

    /// Upper-cases the state keys so lookups are case-insensitive.
    pub fn normalized(self) -> Self {
        match self {
            TaxPolicy::ByState {
                by_state,
                otherwise,
            } => TaxPolicy::ByState {
                by_state: by_state
                    .into_iter()
                    .map(|(state, rate)| (state.trim().to_ascii_uppercase(), rate))
                    .collect(),
                otherwise,
            },
            policy => policy,
        }
    }

    pub fn rate_for(&self, state: Option<&str>) -> Decimal {
        match self {
            TaxPolicy::Rate { rate } => *rate,
            TaxPolicy::ByState {
                by_state,
                otherwise,
            } => state
                .map(|s| s.trim().to_ascii_uppercase())
                .and_then(|s| by_state.get(&s).copied())
                .unwrap_or(*otherwise),
        }
    }
}

fn non_negative(name: &str, value: Decimal) -> Result<(), String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("{name} must not be negative"));
    }
    Ok(())
}

fn fraction(name: &str, value: Decimal) -> Result<(), String> {
    non_negative(name, value)?;
    if value >= Decimal::ONE {
        return Err(format!("{name} must be a fraction below 1"));
    }
    Ok(())
}

/// A priced order line, with the unit price captured at submission time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub quantity: i32,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(serialize_with = "money::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub shipping_cost: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub tax: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingPolicy {
    pub shipping: ShippingPolicy,
    pub tax: TaxPolicy,
}

impl PricingPolicy {
    pub fn quote(&self, lines: &[PricedLine], state: Option<&str>) -> Quote {
        let subtotal = round_money(
            lines
                .iter()
                .map(|line| line.unit_price * Decimal::from(line.quantity))
                .sum(),
        );
        let weight: Decimal = lines
            .iter()
            .map(|line| line.weight * Decimal::from(line.quantity))
            .sum();

        let shipping_cost = if lines.is_empty() {
            Decimal::ZERO
        } else {
            self.shipping.cost(subtotal, weight)
        };
        let tax = round_money(subtotal * self.tax.rate_for(state));

        Quote {
            subtotal,
            shipping_cost,
            tax,
            total: subtotal + shipping_cost + tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(price: &str, quantity: i32, weight: &str) -> PricedLine {
        PricedLine {
            unit_price: dec(price),
            quantity,
            weight: dec(weight),
        }
    }

    fn shipping(json: &str) -> ShippingPolicy {
        let policy: ShippingPolicy = serde_json::from_str(json).unwrap();
        policy.validate().unwrap();
        policy
    }

    #[test]
    fn flat_shipping_and_zero_tax_by_default() {
        let quote = PricingPolicy::default().quote(&[line("2.99", 3, "0.1")], None);
        assert_eq!(quote.subtotal, dec("8.97"));
        assert_eq!(quote.shipping_cost, dec("5.99"));
        assert_eq!(quote.tax, Decimal::ZERO);
        assert_eq!(quote.total, dec("14.96"));
    }

    #[test]
    fn empty_cart_costs_nothing() {
        let quote = PricingPolicy::default().quote(&[], None);
        assert_eq!(quote.total, Decimal::ZERO);
    }

    #[test]
    fn tiered_shipping_uses_first_matching_bracket() {
        let policy = shipping(
            r#"{"tiered": [{"upTo": 25, "amount": 7.5}, {"upTo": "100", "amount": 4}, {"else": true, "amount": 0}]}"#,
        );
        assert_eq!(policy.cost(dec("25.00"), Decimal::ZERO), dec("7.50"));
        assert_eq!(policy.cost(dec("25.01"), Decimal::ZERO), dec("4.00"));
        assert_eq!(policy.cost(dec("100.01"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn free_above_threshold() {
        let policy = shipping(r#"{"freeAbove": 50, "elseFlat": 6.5}"#);
        assert_eq!(policy.cost(dec("50.00"), Decimal::ZERO), dec("6.50"));
        assert_eq!(policy.cost(dec("50.01"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn weight_brackets_follow_parcel_weight() {
        let policy = shipping(
            r#"{"weightTiered": [
                {"upToKg": 1, "amount": 5.99},
                {"upToKg": 5, "amount": 12.99},
                {"upToKg": 10, "amount": 19.99},
                {"else": true, "amount": 29.99}
            ]}"#,
        );
        let pricing = PricingPolicy {
            shipping: policy,
            tax: TaxPolicy::default(),
        };
        assert_eq!(
            pricing.quote(&[line("2.99", 5, "0.1")], None).shipping_cost,
            dec("5.99")
        );
        assert_eq!(
            pricing.quote(&[line("2.99", 10, "0.1")], None).shipping_cost,
            dec("12.99")
        );
        assert_eq!(
            pricing.quote(&[line("12.99", 2, "5.0")], None).shipping_cost,
            dec("29.99")
        );
    }

    #[test]
    fn malformed_brackets_are_rejected() {
        let cases = [
            r#"{"tiered": []}"#,
            r#"{"tiered": [{"upTo": 10, "amount": 1}]}"#,
            r#"{"tiered": [{"upTo": 10, "amount": 1}, {"upTo": 5, "amount": 2}, {"else": true, "amount": 0}]}"#,
            r#"{"tiered": [{"else": true, "amount": 1}, {"else": true, "amount": 0}]}"#,
            r#"{"tiered": [{"amount": 1}, {"else": true, "amount": 0}]}"#,
            r#"{"flat": -1}"#,
        ];
        for case in cases {
            let policy: ShippingPolicy = serde_json::from_str(case).unwrap();
            assert!(policy.validate().is_err(), "accepted {case}");
        }
    }

    #[test]
    fn tax_is_rounded_half_up() {
        let pricing = PricingPolicy {
            shipping: ShippingPolicy::Flat { flat: Decimal::ZERO },
            tax: TaxPolicy::Rate { rate: dec("0.05") },
        };
        // 0.05 * 8.97 = 0.4485
        let quote = pricing.quote(&[line("2.99", 3, "0")], None);
        assert_eq!(quote.tax, dec("0.45"));
        assert_eq!(quote.total, quote.subtotal + quote.shipping_cost + quote.tax);
    }

    #[test]
    fn tax_by_state_is_case_insensitive() {
        let policy: TaxPolicy =
            serde_json::from_str(r#"{"byState": {"ca": 0.0899, "NY": "0.0854"}, "else": 0.01}"#)
                .unwrap();
        let policy = policy.normalized();
        policy.validate().unwrap();
        assert_eq!(policy.rate_for(Some("CA")), dec("0.0899"));
        assert_eq!(policy.rate_for(Some(" ny ")), dec("0.0854"));
        assert_eq!(policy.rate_for(Some("TX")), dec("0.01"));
        assert_eq!(policy.rate_for(None), dec("0.01"));
    }

    #[test]
    fn tax_rate_must_be_a_fraction() {
        let policy: TaxPolicy = serde_json::from_str(r#"{"rate": 1.5}"#).unwrap();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn max_order_total_matches_column_precision() {
        assert_eq!(MAX_ORDER_TOTAL, dec("99999999.99"));
    }
}
