//! Cookie sessions for the admin console.
//!
//! Sessions live in memory by default, which drops them on restart. The
//! database store keeps them in the `sessions` table so several nodes, or a
//! restarted node, see the same logins.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use tower_sessions::{
    Expiry, MemoryStore, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
    session::{Id, Record},
    session_store,
};

use crate::{
    config::{AppConfig, SessionBackend},
    entity::sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as Sessions},
};

pub const SESSION_COOKIE_NAME: &str = "SESSION";

const SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(5 * 60);

pub fn create_session_layer(
    store: AppSessionStore,
    config: &AppConfig,
) -> SessionManagerLayer<AppSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            config.session_ttl_minutes,
        )))
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Session store selected by configuration.
#[derive(Debug, Clone)]
pub enum AppSessionStore {
    Memory(MemoryStore),
    Database(DbSessionStore),
}

impl AppSessionStore {
    pub fn for_backend(backend: SessionBackend, conn: &DatabaseConnection) -> Self {
        match backend {
            SessionBackend::Memory => AppSessionStore::Memory(MemoryStore::default()),
            SessionBackend::Database => AppSessionStore::Database(DbSessionStore::new(conn.clone())),
        }
    }
}

#[async_trait]
impl SessionStore for AppSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            AppSessionStore::Memory(store) => store.create(record).await,
            AppSessionStore::Database(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            AppSessionStore::Memory(store) => store.save(record).await,
            AppSessionStore::Database(store) => store.save(record).await,
        }
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            AppSessionStore::Memory(store) => store.load(session_id).await,
            AppSessionStore::Database(store) => store.load(session_id).await,
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        match self {
            AppSessionStore::Memory(store) => store.delete(session_id).await,
            AppSessionStore::Database(store) => store.delete(session_id).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbSessionStore {
    conn: DatabaseConnection,
}

impl DbSessionStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn delete_expired(&self) -> session_store::Result<u64> {
        let result = Sessions::delete_many()
            .filter(SessionCol::ExpiresAt.lte(Utc::now().timestamp()))
            .exec(&self.conn)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected)
    }

    /// Periodically removes expired rows until the runtime shuts down.
    pub fn spawn_sweeper(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                match self.delete_expired().await {
                    Ok(0) => {}
                    Ok(removed) => tracing::debug!(removed, "expired sessions removed"),
                    Err(err) => tracing::warn!(error = %err, "session sweep failed"),
                }
            }
        })
    }

    async fn exists(&self, id: &Id) -> session_store::Result<bool> {
        let row = Sessions::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .map_err(backend)?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.exists(&record.id).await? {
            record.id = Id::default();
        }
        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data = serde_json::to_string(record)
            .map_err(|err| session_store::Error::Encode(err.to_string()))?;
        let row = SessionActive {
            id: Set(record.id.to_string()),
            data: Set(data),
            expires_at: Set(record.expiry_date.unix_timestamp()),
        };

        Sessions::insert(row)
            .on_conflict(
                OnConflict::column(SessionCol::Id)
                    .update_columns([SessionCol::Data, SessionCol::ExpiresAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let row = Sessions::find_by_id(session_id.to_string())
            .filter(SessionCol::ExpiresAt.gt(Utc::now().timestamp()))
            .one(&self.conn)
            .await
            .map_err(backend)?;

        row.map(|row| {
            serde_json::from_str(&row.data)
                .map_err(|err| session_store::Error::Decode(err.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        Sessions::delete_by_id(session_id.to_string())
            .exec(&self.conn)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

fn backend(err: sea_orm::DbErr) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}
