//! Card Authorizer - gateway entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│ Registry │───▶│ Card/Ledger  │───▶│ Gateway  │
//! │  (YAML)  │    │ (mem/pg) │    │   services   │    │  (axum)  │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Usage: `card_authorizer [--env dev] [--port 8080]`

use std::sync::Arc;

use anyhow::Context;

use card_authorizer::authorization::AuthorizationChain;
use card_authorizer::card::{CardRegistry, CardService, InMemoryCardRegistry, PgCardRegistry};
use card_authorizer::config::AppConfig;
use card_authorizer::db::Database;
use card_authorizer::gateway::{self, state::AppState};
use card_authorizer::ledger::LedgerService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

/// Pick the registry: PostgreSQL when a URL is configured, in-memory otherwise
async fn build_registry(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn CardRegistry>, Option<Arc<Database>>)> {
    match config.postgres_url {
        Some(ref url) => {
            let db = Database::connect_with(url, config.postgres_max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            let registry = PgCardRegistry::new(db.pool().clone());
            registry
                .ensure_schema()
                .await
                .context("Failed to initialize cards_tb schema")?;
            Ok((Arc::new(registry), Some(Arc::new(db))))
        }
        None => {
            tracing::warn!("No postgres_url configured, cards are kept in memory only");
            Ok((Arc::new(InMemoryCardRegistry::new()), None))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = card_authorizer::logging::init_logging(&app_config);

    tracing::info!("Starting card authorizer in {} mode", env);

    let (registry, pg_db) = build_registry(&app_config).await?;
    let registry_name = registry.name();

    let hasher = app_config
        .pin_hashing
        .hasher()
        .context("Invalid pin_hashing parameters")?;
    let card_service = Arc::new(CardService::new(
        registry.clone(),
        hasher,
        app_config.card.initial_balance,
    ));

    let policy = app_config.ledger.retry_policy();
    tracing::info!(
        max_attempts = policy.max_attempts,
        timeout_ms = app_config.ledger.timeout_ms,
        "Ledger retry policy"
    );
    let ledger = Arc::new(LedgerService::new(
        registry,
        AuthorizationChain::standard(),
        policy,
    ));

    let state = Arc::new(AppState::new(card_service, ledger, registry_name, pg_db));
    gateway::run_server(&app_config.gateway, state).await
}
