//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::card::CreateCardPayload;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::TransactionPayload;

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Card Authorizer API",
        version = "1.0.0",
        description = "Virtual card issuing, balance queries and transaction authorization.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::card::create_card,
        crate::gateway::handlers::card::get_balance,
        crate::gateway::handlers::transaction::submit_transaction,
    ),
    components(
        schemas(
            HealthResponse,
            CreateCardPayload,
            TransactionPayload,
        )
    ),
    tags(
        (name = "Cards", description = "Card issuing and balance queries"),
        (name = "Transactions", description = "Debit authorization"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
