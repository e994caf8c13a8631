mod common;

use std::collections::HashMap;

use nepkart_api::middleware::session::DbSessionStore;
use tower_sessions::{
    SessionStore,
    cookie::time::{Duration, OffsetDateTime},
    session::{Id, Record},
};

use common::TestApp;

fn record(expires_in: Duration) -> Record {
    let mut data = HashMap::new();
    data.insert(
        "current_admin".to_string(),
        serde_json::json!({"username": "admin"}),
    );
    Record {
        id: Id::default(),
        data,
        expiry_date: OffsetDateTime::now_utc() + expires_in,
    }
}

#[tokio::test]
async fn database_store_round_trips_records() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let store = DbSessionStore::new(app.orm.clone());

    let mut created = record(Duration::minutes(30));
    store.create(&mut created).await?;
    let loaded = store.load(&created.id).await?.expect("stored session");
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.data, created.data);

    let mut changed = created.clone();
    changed
        .data
        .insert("note".to_string(), serde_json::json!("updated"));
    store.save(&changed).await?;
    let reloaded = store.load(&created.id).await?.expect("stored session");
    assert_eq!(reloaded.data.get("note"), Some(&serde_json::json!("updated")));

    store.delete(&created.id).await?;
    assert!(store.load(&created.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn expired_records_are_invisible_and_swept() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let store = DbSessionStore::new(app.orm.clone());

    let mut stale = record(Duration::minutes(-1));
    store.create(&mut stale).await?;
    let mut fresh = record(Duration::minutes(30));
    store.create(&mut fresh).await?;

    assert!(store.load(&stale.id).await?.is_none());
    assert_eq!(store.delete_expired().await?, 1);
    assert!(store.load(&fresh.id).await?.is_some());
    Ok(())
}
