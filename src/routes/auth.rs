use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::{
    dto::auth::LoginRequest,
    error::{AppJson, AppResult},
    middleware::auth::OptionalAdmin,
    response::{AuthCheck, MessageResponse},
    routes::health,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/login", post(login))
        .route("/check", get(check))
        .route("/logout", post(logout))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; the session cookie is set", body = MessageResponse),
        (status = 401, description = "Invalid username or password", body = MessageResponse),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth_service::login(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/check",
    responses(
        (status = 200, description = "Current session state", body = AuthCheck),
    ),
    tag = "Auth"
)]
pub async fn check(OptionalAdmin(admin): OptionalAdmin) -> Json<AuthCheck> {
    Json(auth_service::check(admin))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session ended", body = MessageResponse),
    ),
    tag = "Auth"
)]
pub async fn logout(session: Session) -> AppResult<Json<MessageResponse>> {
    let resp = auth_service::logout(&session).await?;
    Ok(Json(resp))
}
