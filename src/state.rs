use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::pricing::PricingPolicy;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub pricing: Arc<PricingPolicy>,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, pricing: PricingPolicy) -> Self {
        Self {
            orm,
            pricing: Arc::new(pricing),
        }
    }
}
