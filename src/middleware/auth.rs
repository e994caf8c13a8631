use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;

/// Session key under which the signed-in admin is stored.
pub const CURRENT_ADMIN_KEY: &str = "current_admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub username: String,
    pub signed_in_at: DateTime<Utc>,
}

async fn current_admin(parts: &Parts) -> Result<Option<CurrentAdmin>, AppError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };
    let admin = session.get::<CurrentAdmin>(CURRENT_ADMIN_KEY).await?;
    Ok(admin)
}

/// Extractor for admin-only handlers; rejects with 401 without a valid session.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_admin(parts)
            .await?
            .map(RequireAdmin)
            .ok_or(AppError::Unauthorized)
    }
}

/// Extractor that never rejects; `None` when nobody is signed in or the
/// session could not be read.
#[derive(Debug, Clone)]
pub struct OptionalAdmin(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match current_admin(parts).await {
            Ok(admin) => admin,
            Err(err) => {
                tracing::warn!(error = %err, "session lookup failed, treating as signed out");
                None
            }
        };
        Ok(OptionalAdmin(admin))
    }
}
