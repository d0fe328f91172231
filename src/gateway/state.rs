use std::sync::Arc;
use std::time::Instant;

use crate::card::CardService;
use crate::db::Database;
use crate::ledger::LedgerService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub card_service: Arc<CardService>,
    pub ledger: Arc<LedgerService>,
    /// Backing registry name, reported by the health check
    pub registry_name: &'static str,
    /// Present only with the PostgreSQL registry
    pub pg_db: Option<Arc<Database>>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        card_service: Arc<CardService>,
        ledger: Arc<LedgerService>,
        registry_name: &'static str,
        pg_db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            card_service,
            ledger,
            registry_name,
            pg_db,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
