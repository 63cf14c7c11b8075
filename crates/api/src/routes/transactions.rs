//! Ledger posting routes.
//!
//! The expense and income entry screens both submit to `create_transaction`;
//! nothing in the request says which screen it came from. Item type
//! directions alone decide the signs and the total. Transfers get their own
//! endpoint because they produce a paired posting across two accounts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use bursar_core::posting::{ItemInput, PostingError, PostingOutcome, TransferInput};
use bursar_db::repositories::transaction::{
    CreatePostingInput, TransactionFilter, TransactionRepository, TransactionWithItems,
};
use bursar_shared::types::{format_cents, parse_dollars};

use super::{check_membership, internal_error, json_error};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/organizations/{org_id}/transactions/{transaction_id}",
            get(get_transaction),
        )
        .route("/organizations/{org_id}/transfers", post(create_transfer))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by account.
    pub account: Option<Uuid>,
    /// Filter by category.
    pub category: Option<Uuid>,
    /// Filter by contact.
    pub contact: Option<Uuid>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Request body for one posting line item.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Item type ID.
    pub type_id: Uuid,
    /// Item method ID.
    pub method_id: Uuid,
    /// Entered amount as a dollar string (always non-negative).
    pub amount: String,
    /// Optional line description.
    pub description: Option<String>,
}

/// Request body for creating a posting.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Account the posting belongs to.
    pub account_id: Uuid,
    /// Posting date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Transaction description.
    pub description: Option<String>,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Optional contact association.
    pub contact_id: Option<Uuid>,
    /// Pre-existing receipts to associate.
    #[serde(default)]
    pub receipt_ids: Vec<Uuid>,
    /// Line items.
    pub items: Vec<CreateItemRequest>,
}

/// Request body for a transfer between accounts.
#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    /// Account the funds leave.
    pub from_account_id: Uuid,
    /// Account the funds enter.
    pub to_account_id: Uuid,
    /// Transfer amount as a dollar string (must be positive).
    pub amount: String,
    /// Posting date for both sides.
    pub date: NaiveDate,
    /// Optional description applied to both postings.
    pub description: Option<String>,
}

/// Response for a transaction item.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Item type ID.
    pub type_id: Uuid,
    /// Item method ID.
    pub method_id: Uuid,
    /// Signed amount in cents.
    pub amount_cents: i64,
    /// Signed amount formatted as dollars.
    pub amount: String,
    /// Line description.
    pub description: Option<String>,
}

/// Response for a transaction with its items.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Signed amount in cents.
    pub amount_cents: i64,
    /// Signed amount formatted as dollars.
    pub amount: String,
    /// Posting date.
    pub date: String,
    /// Description.
    pub description: Option<String>,
    /// Category ID.
    pub category_id: Option<Uuid>,
    /// Contact ID.
    pub contact_id: Option<Uuid>,
    /// Originating reimbursement request, if this is an approval posting.
    pub reimbursement_request_id: Option<Uuid>,
    /// User who entered the posting.
    pub created_by: Uuid,
    /// Created at timestamp.
    pub created_at: String,
    /// The transaction's items.
    pub items: Vec<ItemResponse>,
}

/// Response for a transaction list row (without items).
#[derive(Debug, Serialize)]
pub struct TransactionListItem {
    /// Transaction ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Signed amount in cents.
    pub amount_cents: i64,
    /// Signed amount formatted as dollars.
    pub amount: String,
    /// Posting date.
    pub date: String,
    /// Description.
    pub description: Option<String>,
    /// Category ID.
    pub category_id: Option<Uuid>,
    /// Created at timestamp.
    pub created_at: String,
}

impl TransactionResponse {
    pub(crate) fn from_record(record: TransactionWithItems) -> Self {
        let t = record.transaction;
        Self {
            id: t.id,
            account_id: t.account_id,
            amount_cents: t.amount_cents,
            amount: format_cents(t.amount_cents),
            date: t.date.to_string(),
            description: t.description,
            category_id: t.category_id,
            contact_id: t.contact_id,
            reimbursement_request_id: t.reimbursement_request_id,
            created_by: t.created_by,
            created_at: t.created_at.to_rfc3339(),
            items: record
                .items
                .into_iter()
                .map(|item| ItemResponse {
                    id: item.id,
                    type_id: item.type_id,
                    method_id: item.method_id,
                    amount_cents: item.amount_cents,
                    amount: format_cents(item.amount_cents),
                    description: item.description,
                })
                .collect(),
        }
    }
}

/// Maps a posting error onto an HTTP response, hiding infrastructure
/// details behind the generic message.
fn posting_error_response(e: &PostingError) -> Response {
    let status = e.http_status_code();
    if status >= 500 {
        return internal_error(e);
    }
    json_error(
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
        e.error_code(),
        &e.to_string(),
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/organizations/{org_id}/transactions` - List postings with filters.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());
    let filter = TransactionFilter {
        account_id: query.account,
        category_id: query.category,
        contact_id: query.contact,
        date_from: query.from,
        date_to: query.to,
    };

    match repo.list_transactions(org_id, filter).await {
        Ok(transactions) => {
            let items: Vec<TransactionListItem> = transactions
                .into_iter()
                .map(|t| TransactionListItem {
                    id: t.id,
                    account_id: t.account_id,
                    amount_cents: t.amount_cents,
                    amount: format_cents(t.amount_cents),
                    date: t.date.to_string(),
                    description: t.description,
                    category_id: t.category_id,
                    created_at: t.created_at.to_rfc3339(),
                })
                .collect();

            (StatusCode::OK, Json(json!({ "transactions": items }))).into_response()
        }
        Err(e) => posting_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/transactions/{transaction_id}` - Get one
/// posting with its items.
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.get_transaction(org_id, transaction_id).await {
        Ok(record) => (
            StatusCode::OK,
            Json(TransactionResponse::from_record(record)),
        )
            .into_response(),
        Err(e) => posting_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/transactions` - Create a posting.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(body): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    if body.items.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_POSTING",
            "A posting needs at least one item",
        );
    }

    let mut items = Vec::with_capacity(body.items.len());
    for item in &body.items {
        let amount_cents = match parse_dollars(&item.amount) {
            Ok(cents) => cents,
            Err(e) => {
                return json_error(StatusCode::BAD_REQUEST, "INVALID_AMOUNT", &e.to_string());
            }
        };
        items.push(ItemInput {
            type_id: item.type_id,
            method_id: item.method_id,
            amount_cents,
            description: item.description.clone(),
        });
    }

    let repo = TransactionRepository::new((*state.db).clone());
    let input = CreatePostingInput {
        organization_id: org_id,
        account_id: body.account_id,
        date: body.date,
        description: body.description,
        category_id: body.category_id,
        contact_id: body.contact_id,
        receipt_ids: body.receipt_ids,
        items,
        created_by: auth.user_id(),
    };

    match repo.create_posting(input).await {
        Ok(record) => {
            info!(
                transaction_id = %record.transaction.id,
                amount_cents = record.transaction.amount_cents,
                "Posting created"
            );
            (
                StatusCode::CREATED,
                Json(TransactionResponse::from_record(record)),
            )
                .into_response()
        }
        Err(e) => posting_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/transfers` - Transfer between accounts.
///
/// Insufficient funds is a soft, user-facing outcome (nothing was
/// written), not a server error.
async fn create_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(body): Json<CreateTransferRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let amount_cents = match parse_dollars(&body.amount) {
        Ok(cents) => cents,
        Err(e) => {
            return json_error(StatusCode::BAD_REQUEST, "INVALID_AMOUNT", &e.to_string());
        }
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let input = TransferInput {
        from_account_id: body.from_account_id,
        to_account_id: body.to_account_id,
        amount_cents,
        date: body.date,
        description: body.description,
    };

    match repo.create_transfer(org_id, input, auth.user_id()).await {
        Ok(PostingOutcome::Completed(record)) => {
            info!(
                outgoing = %record.outgoing.transaction.id,
                incoming = %record.incoming.transaction.id,
                amount_cents,
                "Transfer posted"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "outgoing": TransactionResponse::from_record(record.outgoing),
                    "incoming": TransactionResponse::from_record(record.incoming),
                })),
            )
                .into_response()
        }
        Ok(PostingOutcome::InsufficientFunds(short)) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_FUNDS",
            &short.user_message(),
        ),
        Err(e) => posting_error_response(&e),
    }
}
