use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    /// In stock but at or below the low-stock threshold.
    Low,
    /// Stock is zero.
    Out,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub category: Option<Category>,
    pub stock: Option<StockFilter>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaxRateQuery {
    /// Two-letter state code.
    pub state: Option<String>,
}
