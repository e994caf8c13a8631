use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::LoginRequest,
        orders::{CreateOrderRequest, OrderLineRequest, QuoteRequest, TaxRateResponse, UpdateOrderStatusRequest},
        products::ProductInput,
    },
    middleware::session::SESSION_COOKIE_NAME,
    models::{Category, Customer, Order, OrderItem, OrderStatus, Product},
    pricing::Quote,
    response::{AuthCheck, MessageResponse},
    routes::{auth, health, orders, params, pricing, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::check,
        auth::logout,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::quote_order,
        orders::get_order_by_order_id,
        orders::get_order,
        orders::update_status,
        orders::delete_order,
        pricing::tax_rate
    ),
    components(
        schemas(
            health::HealthStatus,
            LoginRequest,
            MessageResponse,
            AuthCheck,
            Category,
            Product,
            ProductInput,
            params::StockFilter,
            Customer,
            OrderItem,
            OrderStatus,
            Order,
            OrderLineRequest,
            CreateOrderRequest,
            QuoteRequest,
            UpdateOrderStatusRequest,
            Quote,
            TaxRateResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Auth", description = "Admin sign-in"),
        (name = "Products", description = "Catalog"),
        (name = "Orders", description = "Checkout and order management"),
        (name = "Pricing", description = "Shipping and tax configuration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
