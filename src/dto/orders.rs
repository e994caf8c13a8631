use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::products::TEXT_MAX_LEN,
    error::{AppError, AppResult},
    models::Customer,
};

/// Largest quantity accepted for a single product in one order.
pub const MAX_LINE_QUANTITY: i32 = 9_999;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: i32,
    pub quantity: i32,
}

/// Checkout payload. Lines are given either as `items` or, in the older
/// client shape, as a `productQuantities` map keyed by product id.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer: Customer,
    #[serde(default)]
    pub items: Option<Vec<OrderLineRequest>>,
    #[serde(default)]
    pub product_quantities: Option<BTreeMap<i32, i32>>,
}

impl CreateOrderRequest {
    /// Quantities per product id, duplicates merged, in ascending id order.
    pub fn lines(&self) -> AppResult<BTreeMap<i32, i32>> {
        merge_lines(self.items.as_deref(), self.product_quantities.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Option<Vec<OrderLineRequest>>,
    #[serde(default)]
    pub product_quantities: Option<BTreeMap<i32, i32>>,
    /// Customer state code used to pick the tax rate.
    #[serde(default)]
    pub state: Option<String>,
}

impl QuoteRequest {
    pub fn lines(&self) -> AppResult<BTreeMap<i32, i32>> {
        merge_lines(self.items.as_deref(), self.product_quantities.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// One of `RECEIVED`, `IN_PROGRESS`, `SHIPPED`.
    pub status: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaxRateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(serialize_with = "crate::money::serialize_plain")]
    #[schema(value_type = f64)]
    pub rate: rust_decimal::Decimal,
}

fn merge_lines(
    items: Option<&[OrderLineRequest]>,
    product_quantities: Option<&BTreeMap<i32, i32>>,
) -> AppResult<BTreeMap<i32, i32>> {
    let pairs: Vec<(i32, i32)> = match (items, product_quantities) {
        (Some(items), None) => items
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect(),
        (None, Some(map)) => map.iter().map(|(&id, &qty)| (id, qty)).collect(),
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "Provide either items or productQuantities, not both".into(),
            ));
        }
        (None, None) => {
            return Err(AppError::Validation("Order must contain at least one item".into()));
        }
    };

    if pairs.is_empty() {
        return Err(AppError::Validation("Order must contain at least one item".into()));
    }

    let mut lines = BTreeMap::new();
    for (product_id, quantity) in pairs {
        if quantity <= 0 {
            return Err(AppError::Validation(format!(
                "Quantity for product {product_id} must be positive"
            )));
        }
        let total = lines.entry(product_id).or_insert(0_i32);
        *total = total
            .checked_add(quantity)
            .filter(|sum| *sum <= MAX_LINE_QUANTITY)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Quantity for product {product_id} must not exceed {MAX_LINE_QUANTITY}"
                ))
            })?;
    }
    Ok(lines)
}

const PHONE_MAX_LEN: usize = 64;
const STATE_MAX_LEN: usize = 64;
const ZIP_MAX_LEN: usize = 32;

/// Trims every customer field and checks the contact details against the
/// widths of the `orders` columns they land in.
pub fn validate_customer(customer: &Customer) -> AppResult<Customer> {
    let field = |name: &str, value: &str, max_len: usize| -> AppResult<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::Validation(format!("customer.{name} must not be empty")));
        }
        if value.chars().count() > max_len {
            return Err(AppError::Validation(format!(
                "customer.{name} must be at most {max_len} characters"
            )));
        }
        Ok(value.to_string())
    };

    let email = field("email", &customer.email, TEXT_MAX_LEN)?;
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(format!(
            "customer.email is not a valid address: {email}"
        )));
    }

    Ok(Customer {
        first_name: field("firstName", &customer.first_name, TEXT_MAX_LEN)?,
        last_name: field("lastName", &customer.last_name, TEXT_MAX_LEN)?,
        email,
        phone: field("phone", &customer.phone, PHONE_MAX_LEN)?,
        address: field("address", &customer.address, TEXT_MAX_LEN)?,
        city: field("city", &customer.city, TEXT_MAX_LEN)?,
        state: field("state", &customer.state, STATE_MAX_LEN)?,
        zip_code: field("zipCode", &customer.zip_code, ZIP_MAX_LEN)?,
    })
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            first_name: "Sita".into(),
            last_name: "Sharma".into(),
            email: "sita@example.com".into(),
            phone: "555-0100".into(),
            address: "1 Durbar Marg".into(),
            city: "Austin".into(),
            state: "TX".into(),
            zip_code: "73301".into(),
        }
    }

    #[test]
    fn merges_duplicate_lines() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "customer": customer(),
            "items": [
                {"productId": 2, "quantity": 1},
                {"productId": 1, "quantity": 2},
                {"productId": 2, "quantity": 3}
            ]
        }))
        .unwrap();
        let lines = request.lines().unwrap();
        assert_eq!(lines.into_iter().collect::<Vec<_>>(), vec![(1, 2), (2, 4)]);
    }

    #[test]
    fn accepts_product_quantities_map() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "customer": customer(),
            "productQuantities": {"7": 3}
        }))
        .unwrap();
        assert_eq!(request.lines().unwrap().get(&7), Some(&3));
    }

    #[test]
    fn rejects_bad_line_sets() {
        for body in [
            serde_json::json!({"customer": customer()}),
            serde_json::json!({"customer": customer(), "items": []}),
            serde_json::json!({"customer": customer(), "items": [{"productId": 1, "quantity": 0}]}),
            serde_json::json!({"customer": customer(), "items": [{"productId": 1, "quantity": 10000}]}),
            serde_json::json!({
                "customer": customer(),
                "items": [{"productId": 1, "quantity": 1}],
                "productQuantities": {"1": 1}
            }),
        ] {
            let request: CreateOrderRequest = serde_json::from_value(body).unwrap();
            assert!(request.lines().is_err());
        }
    }

    #[test]
    fn customer_fields_are_checked() {
        let mut bad = customer();
        bad.city = "  ".into();
        assert!(validate_customer(&bad).is_err());

        for email in ["sita", "sita@", "@example.com", "sita@example", "si ta@example.com"] {
            let mut bad = customer();
            bad.email = email.into();
            assert!(validate_customer(&bad).is_err(), "accepted {email}");
        }

        let mut padded = customer();
        padded.first_name = " Sita ".into();
        assert_eq!(validate_customer(&padded).unwrap().first_name, "Sita");
    }

    #[test]
    fn customer_fields_fit_their_columns() {
        let mut zip = customer();
        zip.zip_code = "9".repeat(ZIP_MAX_LEN + 1);
        assert!(validate_customer(&zip).is_err());

        let mut state = customer();
        state.state = "T".repeat(STATE_MAX_LEN + 1);
        assert!(validate_customer(&state).is_err());

        let mut city = customer();
        city.city = "é".repeat(TEXT_MAX_LEN);
        assert!(validate_customer(&city).is_ok());
    }
}
