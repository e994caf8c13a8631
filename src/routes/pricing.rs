use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::orders::TaxRateResponse,
    error::{AppQuery, AppResult},
    routes::params::TaxRateQuery,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/rate", get(tax_rate))
}

#[utoipa::path(
    get,
    path = "/api/tax/rate",
    params(TaxRateQuery),
    responses(
        (status = 200, description = "Tax rate applied to orders for the state", body = TaxRateResponse),
    ),
    tag = "Pricing"
)]
pub async fn tax_rate(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TaxRateQuery>,
) -> AppResult<Json<TaxRateResponse>> {
    let code = query
        .state
        .map(|code| code.trim().to_ascii_uppercase())
        .filter(|code| !code.is_empty());
    let rate = state.pricing.tax.rate_for(code.as_deref());
    Ok(Json(TaxRateResponse { state: code, rate }))
}
