#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use nepkart_api::{
    app::build_app,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    middleware::session::AppSessionStore,
    services::auth_service,
    state::AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinSet;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "nepkart2026";

pub struct TestApp {
    pub router: Router,
    pub orm: DatabaseConnection,
    pub config: AppConfig,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(&[]).await
    }

    /// Fresh app over an empty SQLite file with the admin seeded. `extra`
    /// overrides configuration variables.
    pub async fn spawn_with(extra: &[(&str, &str)]) -> anyhow::Result<Self> {
        Self::build(extra, 1).await
    }

    /// Same as [`TestApp::spawn`] but with a pool of `max_connections`, so
    /// concurrent requests really race inside the database.
    pub async fn spawn_with_pool(max_connections: u32) -> anyhow::Result<Self> {
        Self::build(&[], max_connections).await
    }

    async fn build(extra: &[(&str, &str)], max_connections: u32) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("nepkart.db").display());

        let mut vars = vec![
            ("DATABASE_URL".to_string(), url),
            ("ADMIN_USERNAME".to_string(), ADMIN_USERNAME.to_string()),
            ("ADMIN_PASSWORD".to_string(), ADMIN_PASSWORD.to_string()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let config = AppConfig::from_lookup(|key| {
            vars.iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })?;

        let orm = create_orm_conn(&config.database_url, max_connections).await?;
        run_migrations(&orm).await?;
        auth_service::ensure_admin(&orm, &config.admin_username, &config.admin_password).await?;

        let store = AppSessionStore::for_backend(config.session_backend, &orm);
        let state = AppState::new(orm.clone(), config.pricing.clone());
        let router = build_app(state, &config, store)?;

        Ok(Self {
            router,
            orm,
            config,
            _dir: dir,
        })
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<TestResponse> {
        let body = match body {
            Some(json) => Body::from(serde_json::to_vec(&json)?),
            None => Body::empty(),
        };
        self.send_raw(method, uri, cookie, body).await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Body,
    ) -> anyhow::Result<TestResponse> {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self.router.clone().oneshot(request.body(body)?).await?;
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse {
            status,
            cookie,
            body,
        })
    }

    /// Fires `count` identical anonymous POSTs at once and returns their
    /// statuses in sorted order.
    pub async fn post_concurrently(
        &self,
        uri: &str,
        body: &Value,
        count: usize,
    ) -> anyhow::Result<Vec<StatusCode>> {
        let payload = serde_json::to_vec(body)?;
        let mut tasks = JoinSet::new();
        for _ in 0..count {
            let request = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.clone()))?;
            let router = self.router.clone();
            tasks.spawn(async move { router.oneshot(request).await });
        }

        let mut statuses = Vec::with_capacity(count);
        while let Some(joined) = tasks.join_next().await {
            statuses.push(joined??.status());
        }
        statuses.sort();
        Ok(statuses)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> anyhow::Result<TestResponse> {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn login(&self) -> anyhow::Result<String> {
        let response = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({
                    "username": ADMIN_USERNAME,
                    "password": ADMIN_PASSWORD
                })),
            )
            .await?;
        anyhow::ensure!(response.status == StatusCode::OK, "login failed: {:?}", response.body);
        response
            .cookie
            .ok_or_else(|| anyhow::anyhow!("login did not set a cookie"))
    }

    /// Creates a product and returns its id.
    pub async fn create_product(&self, cookie: &str, body: Value) -> anyhow::Result<i64> {
        let response = self
            .send(Method::POST, "/api/products", Some(cookie), Some(body))
            .await?;
        anyhow::ensure!(
            response.status == StatusCode::CREATED,
            "create failed: {} {:?}",
            response.status,
            response.body
        );
        response.body["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("product has no id"))
    }
}

pub fn wai_wai() -> Value {
    serde_json::json!({
        "sku": "NEP-FOOD-001",
        "name": "Wai Wai",
        "category": "Food",
        "price": "2.99",
        "stock": 10,
        "lowStockThreshold": 2,
        "weight": "0.1",
        "origin": "Nepal",
        "description": null,
        "imageUrl": "/placeholder-product.svg"
    })
}

pub fn product(sku: &str, price: &str, stock: i64) -> Value {
    let mut body = wai_wai();
    body["sku"] = Value::from(sku);
    body["name"] = Value::from(format!("Product {sku}"));
    body["price"] = Value::from(price);
    body["stock"] = Value::from(stock);
    body
}

pub fn customer() -> Value {
    serde_json::json!({
        "firstName": "Sita",
        "lastName": "Sharma",
        "email": "sita@example.com",
        "phone": "555-0100",
        "address": "1 Durbar Marg",
        "city": "Austin",
        "state": "TX",
        "zipCode": "73301"
    })
}

pub fn order(lines: &[(i64, i64)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(id, quantity)| serde_json::json!({"productId": id, "quantity": quantity}))
        .collect();
    serde_json::json!({ "customer": customer(), "items": items })
}

pub fn approx(value: &Value, expected: f64) -> bool {
    value
        .as_f64()
        .is_some_and(|actual| (actual - expected).abs() < 1e-9)
}
