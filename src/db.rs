use std::{future::Future, time::Duration};

use anyhow::Result;
use sea_orm::sqlx::{self, sqlite::SqliteError};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr, SqlErr};
use sea_orm_migration::MigratorTrait;

use crate::{
    error::{AppError, AppResult},
    migration::Migrator,
};

const MAX_RETRIES: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_DEADLOCK_DETECTED: &str = "40P01";

/// Create a SeaORM connection pool bounded to `max_connections`.
pub async fn create_orm_conn(database_url: &str, max_connections: u32) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply every pending migration. Safe to call on each boot.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}

/// Whether a datastore error is worth retrying: the pool could not hand out
/// a connection, the connection broke underneath the query, or the
/// transaction lost a lock race and can be replayed from the start.
pub fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)) || is_lock_contention(err)
}

fn is_lock_contention(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db)))) = err
    else {
        return false;
    };
    let Some(code) = db.code() else {
        return false;
    };
    if db.try_downcast_ref::<SqliteError>().is_some() {
        // Extended result codes carry the primary code in the low byte.
        return code
            .parse::<i32>()
            .is_ok_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED));
    }
    matches!(&*code, PG_SERIALIZATION_FAILURE | PG_DEADLOCK_DETECTED)
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Runs `op`, retrying transient datastore failures up to twice with a
/// short linear backoff. Every other error is returned as is.
pub async fn with_retry<T, F, Fut>(mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(AppError::Orm(err)) if attempt < MAX_RETRIES && is_transient(&err) => {
                attempt += 1;
                tracing::warn!(error = %err, attempt, "transient datastore error, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            result => return result,
        }
    }
}
