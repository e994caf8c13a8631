use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use tower_sessions::Session;

use crate::{
    dto::auth::LoginRequest,
    entity::admin_users::{ActiveModel as AdminActive, Column as AdminCol, Entity as AdminUsers},
    error::{AppError, AppResult},
    middleware::auth::{CURRENT_ADMIN_KEY, CurrentAdmin},
    response::{AuthCheck, MessageResponse},
    state::AppState,
};

/// Verified against when the username is unknown so both failure paths
/// cost one hash verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("nepkart-unknown-user").ok());

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Inserts the admin user unless one with that username already exists.
/// Returns whether a row was created.
pub async fn ensure_admin(
    conn: &DatabaseConnection,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    let existing = AdminUsers::find()
        .filter(AdminCol::Username.eq(username))
        .one(conn)
        .await?;
    if existing.is_some() {
        tracing::debug!(username, "admin user already present");
        return Ok(false);
    }

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    AdminActive {
        id: NotSet,
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    tracing::info!(username, "admin user seeded");
    Ok(true)
}

pub async fn login(
    state: &AppState,
    session: &Session,
    payload: LoginRequest,
) -> AppResult<MessageResponse> {
    let Some((username, password)) = payload.credentials() else {
        tracing::warn!("login rejected: missing credentials");
        return Err(AppError::InvalidCredentials);
    };

    let stored_hash = AdminUsers::find()
        .filter(AdminCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?
        .map(|admin| admin.password_hash);

    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(&password, dummy);
            }
            false
        }
    })
    .await
    .map_err(|err| AppError::Internal(anyhow::anyhow!("password check task failed: {err}")))?;

    if !verified {
        tracing::warn!(username = %username, "login failed");
        return Err(AppError::InvalidCredentials);
    }

    session.cycle_id().await?;
    session
        .insert(
            CURRENT_ADMIN_KEY,
            CurrentAdmin {
                username: username.clone(),
                signed_in_at: Utc::now(),
            },
        )
        .await?;

    tracing::info!(username = %username, "login succeeded");
    Ok(MessageResponse::success("Login successful"))
}

pub fn check(admin: Option<CurrentAdmin>) -> AuthCheck {
    match admin {
        Some(admin) => AuthCheck::signed_in(admin.username),
        None => AuthCheck::anonymous(),
    }
}

/// Drops the session if there is one; calling it signed out is not an error.
pub async fn logout(session: &Session) -> AppResult<MessageResponse> {
    if let Some(admin) = session.get::<CurrentAdmin>(CURRENT_ADMIN_KEY).await? {
        tracing::info!(username = %admin.username, "logout");
    }
    session.flush().await?;
    Ok(MessageResponse::success("Logged out"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_their_password() {
        let hash = hash_password("nepkart2026").unwrap();
        assert!(verify_password("nepkart2026", &hash));
        assert!(!verify_password("nepkart2025", &hash));
        assert!(!verify_password("nepkart2026", "not-a-phc-string"));
    }
}
