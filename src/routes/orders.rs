use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::orders::{CreateOrderRequest, QuoteRequest, UpdateOrderStatusRequest},
    error::{AppJson, AppPath, AppResult},
    middleware::auth::RequireAdmin,
    models::Order,
    pricing::Quote,
    response::MessageResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/quote", post(quote_order))
        .route("/order-id/{order_id}", get(get_order_by_order_id))
        .route("/{id}", get(get_order).delete(delete_order))
        .route("/{id}/status", put(update_status))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders, newest first", body = Vec<Order>),
        (status = 401, description = "Not signed in", body = MessageResponse),
    ),
    security(("session_cookie" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_orders(&state).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid order or unknown product", body = MessageResponse),
        (status = 409, description = "Insufficient stock", body = MessageResponse),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = order_service::create_order(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/orders/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Totals the order would get", body = Quote),
        (status = 400, description = "Invalid lines or unknown product", body = MessageResponse),
    ),
    tag = "Orders"
)]
pub async fn quote_order(
    State(state): State<AppState>,
    AppJson(payload): AppJson<QuoteRequest>,
) -> AppResult<Json<Quote>> {
    let quote = order_service::quote(&state, payload).await?;
    Ok(Json(quote))
}

#[utoipa::path(
    get,
    path = "/api/orders/order-id/{order_id}",
    params(
        ("order_id" = String, Path, description = "Public order token")
    ),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "Order not found", body = MessageResponse),
    ),
    tag = "Orders"
)]
pub async fn get_order_by_order_id(
    State(state): State<AppState>,
    AppPath(order_id): AppPath<String>,
) -> AppResult<Json<Order>> {
    let order = order_service::get_order_by_order_id(&state, &order_id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 401, description = "Not signed in", body = MessageResponse),
        (status = 404, description = "Order not found", body = MessageResponse),
    ),
    security(("session_cookie" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Order>> {
    let order = order_service::get_order(&state, id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = i32, Path, description = "Order id")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order with its new status", body = Order),
        (status = 400, description = "Unknown status", body = MessageResponse),
        (status = 401, description = "Not signed in", body = MessageResponse),
        (status = 404, description = "Order not found", body = MessageResponse),
    ),
    security(("session_cookie" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = order_service::update_status(&state, id, payload).await?;
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id")
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 401, description = "Not signed in", body = MessageResponse),
        (status = 404, description = "Order not found", body = MessageResponse),
    ),
    security(("session_cookie" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    order_service::delete_order(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
