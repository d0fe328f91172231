//! Card endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::super::state::AppState;
use super::super::types::{ApiResponse, CreateCardPayload, FieldErrors, error_codes};
use crate::card::CardServiceError;

/// Issue a new card
///
/// - 201 + the submitted payload on success
/// - 422 + the submitted payload when the number is already registered
/// - 400 + field errors when the number or PIN is malformed
#[utoipa::path(
    post,
    path = "/cartoes",
    request_body = CreateCardPayload,
    responses(
        (status = 201, description = "Card created", body = CreateCardPayload),
        (status = 422, description = "Card number already registered", body = CreateCardPayload),
        (status = 400, description = "Malformed card number or PIN")
    ),
    tag = "Cards"
)]
pub async fn create_card(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCardPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match state.card_service.create_card(payload).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(CardServiceError::AlreadyExists(original)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(original)).into_response()
        }
        Err(CardServiceError::Invalid(e)) => {
            let mut errors = FieldErrors::new();
            errors.insert(e.field().to_string(), e.to_string());
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::invalid_fields(errors)),
            )
                .into_response()
        }
        Err(e) => server_error(e),
    }
}

/// Current balance of a card
///
/// Answers a bare JSON string with 2 fraction digits, e.g. `"500.00"`.
#[utoipa::path(
    get,
    path = "/cartoes/{numeroCartao}",
    params(
        ("numeroCartao" = String, Path, description = "Card number")
    ),
    responses(
        (status = 200, description = "Card balance", body = String, example = json!("500.00")),
        (status = 404, description = "Card not found")
    ),
    tag = "Cards"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(numero_cartao): Path<String>,
) -> Response {
    match state.card_service.get_balance(&numero_cartao).await {
        Ok(balance) => (StatusCode::OK, Json(balance)).into_response(),
        Err(CardServiceError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => server_error(e),
    }
}

pub(super) fn malformed_body(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            error_codes::MALFORMED_BODY,
            rejection.body_text(),
        )),
    )
        .into_response()
}

fn server_error(e: CardServiceError) -> Response {
    error!(error = %e, "Card request failed");
    let code = match e {
        CardServiceError::Storage(_) => error_codes::STORAGE_ERROR,
        _ => error_codes::INTERNAL_ERROR,
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(code, "internal error")),
    )
        .into_response()
}
