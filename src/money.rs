//! Decimal helpers for monetary values.
//!
//! Amounts are held as [`Decimal`] end to end and only turned into JSON
//! numbers at the response boundary. Numbers are written from the decimal
//! text, so `2.00` leaves as `2.00` and never passes through a float.

use rust_decimal::{Decimal, RoundingStrategy, serde::arbitrary_precision};
use serde::Serializer;

const MONEY_PLACES: u32 = 2;

/// Largest accepted unit price or weight. Sits below the widths of the
/// `price NUMERIC(10,2)` and `weight NUMERIC(10,3)` columns; order totals
/// are bounded separately by `pricing::MAX_ORDER_TOTAL`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2);

/// Half-up rounding to cents.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_places(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Serializes a decimal as a JSON number with exactly two fractional digits.
pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut rounded = round_money(*value);
    rounded.rescale(MONEY_PLACES);
    arbitrary_precision::serialize(&rounded, serializer)
}

/// Serializes a non-monetary decimal (weights, rates) as a JSON number
/// without trailing zeros.
pub fn serialize_plain<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    arbitrary_precision::serialize(&value.normalize(), serializer)
}
