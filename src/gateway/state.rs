//! Shared application state for the HTTP gateway

use std::sync::Arc;

use crate::auth::service::AuthService;
use crate::config::AppConfig;
use crate::db::Database;
use crate::funding::service::FundingLedger;
use crate::requests::engine::RequestEngine;

/// Shared state handed to every handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: AuthService,
    pub requests: RequestEngine,
    pub funding: FundingLedger,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: &AppConfig) -> Self {
        let pool = db.pool().clone();
        Self {
            auth: AuthService::new(
                pool.clone(),
                config.jwt_secret().to_string(),
                config.auth.clone(),
            ),
            requests: RequestEngine::new(pool.clone()),
            funding: FundingLedger::new(pool),
            db,
        }
    }
}
