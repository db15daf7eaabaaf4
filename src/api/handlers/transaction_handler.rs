//! Transfer handlers.

use std::borrow::Cow;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_vendor, CurrentUser};
use crate::api::AppState;
use crate::domain::{max_amount, TransactionResponse, TransactionStatus, VendorQueueEntry};
use crate::errors::{AppError, AppResult};
use crate::services::TransferRequest;
use crate::types::{PaginatedTransactions, PaginationParams};

/// New transfer request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    /// Currency pair, e.g. `USD_NGN`
    #[validate(length(min = 7, max = 7, message = "Pair must look like USD_NGN"))]
    #[schema(example = "USD_NGN")]
    pub pair: String,
    #[validate(custom(function = "validate_amount_sent"))]
    #[schema(value_type = String, example = "100.00")]
    pub amount_sent: Decimal,
    /// Free-form recipient details (name, bank, account number, ...)
    #[schema(value_type = Object, example = json!({"name": "Chidi Okafor", "bank": "GTBank", "account_number": "0123456789"}))]
    pub recipient_details: serde_json::Value,
    /// Optional payout vendor
    pub vendor_id: Option<i32>,
}

fn validate_amount_sent(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount > Decimal::ZERO && *amount <= max_amount() {
        return Ok(());
    }

    let mut err = ValidationError::new("amount_range");
    err.message = Some(Cow::Owned(format!(
        "Amount must be greater than 0 and at most {}",
        max_amount()
    )));
    Err(err)
}

/// Status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    #[schema(example = "processing")]
    pub status: String,
}

/// Proof-of-payment attachment
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProofRequest {
    #[validate(url(message = "Proof must be a URL"))]
    #[schema(example = "https://files.example.com/proofs/receipt.png")]
    pub url: String,
}

/// Create transfer routes
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/vendor/queue", get(vendor_queue))
        .route("/:id", get(get_transaction))
        .route("/:id/status", put(update_status))
        .route("/:id/proof", put(attach_proof))
}

/// Create a transfer at the current customer rate
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transfer created", body = TransactionResponse),
        (status = 400, description = "Validation error or unknown pair"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_transaction(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    let tx = state
        .transaction_service
        .create_transfer(
            &current_user.actor(),
            TransferRequest {
                pair: payload.pair,
                amount_sent: payload.amount_sent,
                recipient_details: payload.recipient_details,
                vendor_id: payload.vendor_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(tx.into())))
}

/// List transfers (own, or all for admins)
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of transfers, newest first", body = PaginatedTransactions),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_transactions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PaginatedTransactions>> {
    let page = state
        .transaction_service
        .list_transfers(&current_user.actor(), &params)
        .await?;

    Ok(Json(page.map(TransactionResponse::from)))
}

/// Get a transfer
#[utoipa::path(
    get,
    path = "/transactions/{id}",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction row ID")),
    responses(
        (status = 200, description = "Transfer", body = TransactionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the sender, vendor or an admin"),
        (status = 404, description = "Transfer not found")
    )
)]
pub async fn get_transaction(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<TransactionResponse>> {
    let tx = state
        .transaction_service
        .get_transfer(&current_user.actor(), id)
        .await?;

    Ok(Json(tx.into()))
}

/// Advance a transfer's status (vendor or admin)
#[utoipa::path(
    put,
    path = "/transactions/{id}/status",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction row ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = TransactionResponse),
        (status = 400, description = "Unknown status or transfer already final"),
        (status = 403, description = "Vendor or admin only"),
        (status = 404, description = "Transfer not found")
    )
)]
pub async fn update_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<TransactionResponse>> {
    require_vendor(&current_user)?;

    let status = TransactionStatus::parse_known(&payload.status)
        .ok_or_else(|| AppError::validation(format!("Unknown status '{}'", payload.status)))?;

    let tx = state
        .transaction_service
        .update_status(&current_user.actor(), id, status)
        .await?;

    Ok(Json(tx.into()))
}

/// Attach proof of payment (sender only)
#[utoipa::path(
    put,
    path = "/transactions/{id}/proof",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction row ID")),
    request_body = ProofRequest,
    responses(
        (status = 200, description = "Proof attached", body = TransactionResponse),
        (status = 400, description = "Validation error or transfer already final"),
        (status = 403, description = "Sender only"),
        (status = 404, description = "Transfer not found")
    )
)]
pub async fn attach_proof(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ProofRequest>,
) -> AppResult<Json<TransactionResponse>> {
    let tx = state
        .transaction_service
        .attach_proof(&current_user.actor(), id, payload.url)
        .await?;

    Ok(Json(tx.into()))
}

/// Transfers assigned to the calling vendor
#[utoipa::path(
    get,
    path = "/transactions/vendor/queue",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assigned transfers with sender email", body = Vec<VendorQueueEntry>),
        (status = 403, description = "Vendor or admin only")
    )
)]
pub async fn vendor_queue(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VendorQueueEntry>>> {
    require_vendor(&current_user)?;

    let queue = state
        .transaction_service
        .vendor_queue(&current_user.actor())
        .await?;

    Ok(Json(queue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn create_request(amount: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            pair: "USD_NGN".into(),
            amount_sent: Decimal::from_str(amount).unwrap(),
            recipient_details: serde_json::json!({ "name": "Chidi Okafor" }),
            vendor_id: None,
        }
    }

    #[test]
    fn amount_sent_must_fit_money_column() {
        assert!(create_request("100.00").validate().is_ok());
        assert!(create_request("99999999999999.99").validate().is_ok());
        assert!(create_request("100000000000000").validate().is_err());
        assert!(create_request("0").validate().is_err());
    }
}
