//! Transaction endpoint

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use super::super::state::AppState;
use super::super::types::{ApiResponse, TransactionPayload, error_codes};
use super::card::malformed_body;
use crate::authorization::Rejection;
use crate::ledger::LedgerError;

/// Authorize and debit a transaction
///
/// - 201 + `OK` when the debit is committed
/// - 422 + the rejection code (`CARD_NOT_FOUND`, `INVALID_PIN`,
///   `INVALID_AMOUNT`, `INSUFFICIENT_BALANCE`) as plain text
/// - 503 when the card stayed contended for the whole retry budget
#[utoipa::path(
    post,
    path = "/transacoes",
    request_body = TransactionPayload,
    responses(
        (status = 201, description = "Debit committed", body = String, example = json!("OK")),
        (status = 422, description = "Rejected by an authorization rule", body = String, example = json!("INSUFFICIENT_BALANCE")),
        (status = 503, description = "Card under contention, retry later"),
        (status = 500, description = "Internal or storage error")
    ),
    tag = "Transactions"
)]
pub async fn submit_transaction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    let request = match payload.into_request() {
        Ok(request) => request,
        Err(rejection) => return rejected(rejection),
    };

    match state.ledger.authorize_and_debit(&request).await {
        Ok(receipt) => {
            debug!(
                transaction_id = %receipt.transaction_id,
                attempts = receipt.attempts,
                "Transaction accepted"
            );
            (StatusCode::CREATED, "OK").into_response()
        }
        Err(LedgerError::Rejected(rejection)) => rejected(rejection),
        Err(e) => {
            let code = match e {
                LedgerError::Contention { .. } => {
                    warn!(error = %e, "Transaction abandoned under contention");
                    error_codes::SERVICE_UNAVAILABLE
                }
                LedgerError::Storage(_) => {
                    error!(error = %e, "Transaction failed in storage");
                    error_codes::STORAGE_ERROR
                }
                _ => {
                    error!(error = %e, "Transaction failed");
                    error_codes::INTERNAL_ERROR
                }
            };
            let status =
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ApiResponse::<()>::error(code, e.code()))).into_response()
        }
    }
}

fn rejected(rejection: Rejection) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, rejection.code()).into_response()
}
