use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Food,
    Clothing,
    Decor,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Food, Category::Clothing, Category::Decor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Clothing => "Clothing",
            Category::Decor => "Decor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    InProgress,
    Shipped,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Shipped => "SHIPPED",
        }
    }

    /// Reads a persisted status, mapping legacy values written by older
    /// versions of the store. Never fails.
    pub fn from_stored(raw: &str) -> Self {
        if let Ok(status) = raw.parse() {
            return status;
        }
        match raw.trim().to_ascii_uppercase().as_str() {
            "PROCESSING" => OrderStatus::InProgress,
            "DELIVERED" => OrderStatus::Shipped,
            _ => OrderStatus::Received,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIVED" => Ok(OrderStatus::Received),
            "IN_PROGRESS" => Ok(OrderStatus::InProgress),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            other => Err(format!(
                "Invalid order status: {other} (expected RECEIVED, IN_PROGRESS or SHIPPED)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub category: Category,
    #[serde(serialize_with = "money::serialize")]
    pub price: Decimal,
    pub stock: i32,
    pub low_stock_threshold: i32,
    #[serde(serialize_with = "money::serialize_plain")]
    pub weight: Decimal,
    pub origin: String,
    pub description: Option<String>,
    pub image_url: String,
    /// Derived from `stock`; never stored.
    pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// A line of a placed order. `name` and `sku` are snapshots taken when the
/// order was placed and stay valid after the product changes or is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    #[serde(serialize_with = "money::serialize")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub order_id: String,
    pub customer: Customer,
    pub order_items: Vec<OrderItem>,
    #[serde(serialize_with = "money::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub shipping_cost: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub tax: Decimal,
    #[serde(serialize_with = "money::serialize")]
    pub total: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_strict() {
        assert_eq!("SHIPPED".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("FLYING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn stored_status_maps_legacy_values() {
        assert_eq!(OrderStatus::from_stored("IN_PROGRESS"), OrderStatus::InProgress);
        assert_eq!(OrderStatus::from_stored("pending"), OrderStatus::Received);
        assert_eq!(OrderStatus::from_stored("PROCESSING"), OrderStatus::InProgress);
        assert_eq!(OrderStatus::from_stored("delivered"), OrderStatus::Shipped);
        assert_eq!(OrderStatus::from_stored("CANCELLED"), OrderStatus::Received);
        assert_eq!(OrderStatus::from_stored(""), OrderStatus::Received);
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("Toys".parse::<Category>().is_err());
    }
}
