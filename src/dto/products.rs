use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    images,
    models::Category,
    money::{self, MAX_AMOUNT},
};

/// Full product record sent on create and on update. Every field except
/// `description` and `imageUrl` is required; updates replace the record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub sku: String,
    pub name: String,
    pub category: Category,
    /// Number or decimal string.
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub stock: i32,
    pub low_stock_threshold: i32,
    /// Kilograms; number or decimal string.
    #[schema(value_type = f64)]
    pub weight: Decimal,
    pub origin: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A [`ProductInput`] that passed validation: strings trimmed, money rounded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub weight: Decimal,
    pub origin: String,
    pub description: Option<String>,
    pub image_url: String,
}

impl ProductInput {
    pub fn into_record(self) -> AppResult<ProductRecord> {
        let sku = required("sku", &self.sku, SKU_MAX_LEN)?;
        let name = required("name", &self.name, TEXT_MAX_LEN)?;
        let origin = required("origin", &self.origin, TEXT_MAX_LEN)?;

        if self.price.is_sign_negative() {
            return Err(AppError::Validation("price must not be negative".into()));
        }
        let price = money::round_money(self.price);
        if price > MAX_AMOUNT {
            return Err(AppError::Validation(format!(
                "price must not exceed {MAX_AMOUNT}"
            )));
        }

        if self.weight.is_sign_negative() {
            return Err(AppError::Validation("weight must not be negative".into()));
        }
        let weight = money::round_places(self.weight, 3);
        if weight > MAX_AMOUNT {
            return Err(AppError::Validation(format!(
                "weight must not exceed {MAX_AMOUNT}"
            )));
        }

        if self.stock < 0 {
            return Err(AppError::Validation("stock must not be negative".into()));
        }
        if self.low_stock_threshold < 0 {
            return Err(AppError::Validation(
                "lowStockThreshold must not be negative".into(),
            ));
        }

        Ok(ProductRecord {
            sku,
            name,
            category: self.category,
            price,
            stock: self.stock,
            low_stock_threshold: self.low_stock_threshold,
            weight,
            origin,
            description: self.description,
            image_url: images::normalize(self.image_url),
        })
    }
}

/// Column widths of `products.sku` and the `VARCHAR(255)` text columns.
pub const SKU_MAX_LEN: usize = 64;
pub const TEXT_MAX_LEN: usize = 255;

fn required(field: &str, value: &str, max_len: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn input(json: serde_json::Value) -> ProductInput {
        serde_json::from_value(json).unwrap()
    }

    fn wai_wai() -> serde_json::Value {
        serde_json::json!({
            "sku": " NEP-FOOD-001 ",
            "name": "Wai Wai",
            "category": "Food",
            "price": "2.999",
            "stock": 10,
            "lowStockThreshold": 2,
            "weight": 0.1,
            "origin": "Nepal",
            "description": null
        })
    }

    #[test]
    fn normalizes_a_valid_record() {
        let record = input(wai_wai()).into_record().unwrap();
        assert_eq!(record.sku, "NEP-FOOD-001");
        assert_eq!(record.price, Decimal::from_str("3.00").unwrap());
        assert_eq!(record.weight, Decimal::from_str("0.1").unwrap());
        assert_eq!(record.image_url, images::PLACEHOLDER_IMAGE);
        assert_eq!(record.description, None);
    }

    #[test]
    fn rejects_constraint_violations() {
        for (field, value) in [
            ("sku", serde_json::json!("  ")),
            ("price", serde_json::json!(-1)),
            ("stock", serde_json::json!(-1)),
            ("lowStockThreshold", serde_json::json!(-5)),
            ("weight", serde_json::json!("-0.5")),
            ("price", serde_json::json!("10000000")),
            ("sku", serde_json::json!("S".repeat(SKU_MAX_LEN + 1))),
            ("name", serde_json::json!("N".repeat(TEXT_MAX_LEN + 1))),
            ("origin", serde_json::json!("O".repeat(TEXT_MAX_LEN + 1))),
        ] {
            let mut json = wai_wai();
            json[field] = value;
            assert!(input(json).into_record().is_err(), "accepted bad {field}");
        }
    }

    #[test]
    fn sku_may_fill_its_column() {
        let mut json = wai_wai();
        json["sku"] = serde_json::json!("S".repeat(SKU_MAX_LEN));
        assert_eq!(input(json).into_record().unwrap().sku.len(), SKU_MAX_LEN);
    }

    #[test]
    fn unknown_category_fails_to_parse() {
        let mut json = wai_wai();
        json["category"] = serde_json::json!("Toys");
        assert!(serde_json::from_value::<ProductInput>(json).is_err());
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let mut json = wai_wai();
        json.as_object_mut().unwrap().remove("origin");
        assert!(serde_json::from_value::<ProductInput>(json).is_err());
    }
}
