use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::products::ProductInput,
    error::{AppJson, AppPath, AppQuery, AppResult},
    middleware::auth::RequireAdmin,
    models::Product,
    response::MessageResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{key}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products in id order", body = Vec<Product>),
        (status = 400, description = "Unknown filter value", body = MessageResponse),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product_service::list_products(&state, query).await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{key}",
    params(
        ("key" = String, Path, description = "Numeric product id, or the SKU")
    ),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found", body = MessageResponse),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> AppResult<Json<Product>> {
    let product = product_service::get_product(&state, &key).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product", body = MessageResponse),
        (status = 401, description = "Not signed in", body = MessageResponse),
        (status = 409, description = "SKU already in use", body = MessageResponse),
        (status = 413, description = "Body too large", body = MessageResponse),
    ),
    security(("session_cookie" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(payload): AppJson<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = product_service::create_product(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{key}",
    params(
        ("key" = i32, Path, description = "Product id")
    ),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product replaced", body = Product),
        (status = 400, description = "Invalid product", body = MessageResponse),
        (status = 401, description = "Not signed in", body = MessageResponse),
        (status = 404, description = "Product not found", body = MessageResponse),
        (status = 409, description = "SKU already in use", body = MessageResponse),
    ),
    security(("session_cookie" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<ProductInput>,
) -> AppResult<Json<Product>> {
    let product = product_service::update_product(&state, id, payload).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{key}",
    params(
        ("key" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Not signed in", body = MessageResponse),
        (status = 404, description = "Product not found", body = MessageResponse),
    ),
    security(("session_cookie" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    product_service::delete_product(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
