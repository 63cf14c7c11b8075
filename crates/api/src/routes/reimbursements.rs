//! Reimbursement request routes.
//!
//! The status endpoint takes the desired next status directly - the action
//! identifier IS the target state. After any committed transition the
//! requester is notified by email, best-effort and outside the database
//! transaction: a failed send is logged and never rolls anything back.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use bursar_core::posting::PostingOutcome;
use bursar_core::reimbursement::{
    ApproveInput, ReimbursementError, RequestStatus, TransitionContext,
};
use bursar_db::UserRepository;
use bursar_db::entities::{receipts, reimbursement_requests};
use bursar_db::repositories::reimbursement::{CreateRequestInput, ReimbursementRepository};
use bursar_shared::types::{format_cents, parse_dollars};

use super::{check_membership, internal_error, json_error};
use crate::routes::transactions::TransactionResponse;

/// Creates the reimbursement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/reimbursements",
            get(list_requests).post(create_request),
        )
        .route(
            "/organizations/{org_id}/reimbursements/{request_id}",
            get(get_request),
        )
        .route(
            "/organizations/{org_id}/reimbursements/{request_id}/status",
            post(transition_request),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing requests.
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    /// Filter by status.
    pub status: Option<String>,
}

/// Request body for creating a reimbursement request.
#[derive(Debug, Deserialize)]
pub struct CreateReimbursementRequest {
    /// Requested amount as a dollar string (must be positive).
    pub amount: String,
    /// Suggested account to draw from.
    pub account_id: Option<Uuid>,
    /// What the money was spent on.
    pub purpose: Option<String>,
    /// Pre-existing receipts to attach.
    #[serde(default)]
    pub receipt_ids: Vec<Uuid>,
}

/// Request body for a status transition.
///
/// `status` is the target state. `amount`, `account_id`, and `category_id`
/// are required only when the target is `approved`.
#[derive(Debug, Deserialize)]
pub struct TransitionRequestBody {
    /// Target status: approved, rejected, void, or pending (reopen).
    pub status: String,
    /// Approval amount as a dollar string.
    pub amount: Option<String>,
    /// Account to draw the reimbursement from.
    pub account_id: Option<Uuid>,
    /// Category for the offsetting transaction.
    pub category_id: Option<Uuid>,
    /// Approver's note to the requester.
    pub note: Option<String>,
}

/// Response for a receipt.
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    /// Receipt ID.
    pub id: Uuid,
    /// Object-store key.
    pub object_key: String,
    /// Original filename.
    pub filename: String,
}

/// Response for a reimbursement request.
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    /// Request ID.
    pub id: Uuid,
    /// The requester.
    pub user_id: Uuid,
    /// Account to draw from, once chosen.
    pub account_id: Option<Uuid>,
    /// Requested amount in cents.
    pub amount_cents: i64,
    /// Requested amount formatted as dollars.
    pub amount: String,
    /// What the money was spent on.
    pub purpose: Option<String>,
    /// Current status.
    pub status: String,
    /// Approver's note.
    pub approver_note: Option<String>,
    /// Who decided the request.
    pub decided_by: Option<Uuid>,
    /// When the request was decided.
    pub decided_at: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
}

impl RequestResponse {
    fn from_model(request: reimbursement_requests::Model) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            account_id: request.account_id,
            amount_cents: request.amount_cents,
            amount: format_cents(request.amount_cents),
            purpose: request.purpose,
            status: RequestStatus::from(request.status).to_string(),
            approver_note: request.approver_note,
            decided_by: request.decided_by,
            decided_at: request.decided_at.map(|at| at.to_rfc3339()),
            created_at: request.created_at.to_rfc3339(),
        }
    }
}

fn receipt_responses(rows: Vec<receipts::Model>) -> Vec<ReceiptResponse> {
    rows.into_iter()
        .map(|receipt| ReceiptResponse {
            id: receipt.id,
            object_key: receipt.object_key,
            filename: receipt.filename,
        })
        .collect()
}

/// Maps a reimbursement error onto an HTTP response.
fn reimbursement_error_response(e: &ReimbursementError) -> Response {
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

/// Notifies the requester of a status change, fire-and-forget.
fn notify_requester(state: &AppState, requester_id: Uuid, status: RequestStatus) {
    let db = (*state.db).clone();
    let notifier = state.notifier.clone();

    tokio::spawn(async move {
        let email = match UserRepository::new(db).find_by_id(requester_id).await {
            Ok(Some(user)) => user.email,
            Ok(None) => {
                warn!(%requester_id, "Requester not found, skipping notification");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load requester for notification");
                return;
            }
        };

        if let Err(e) = notifier.send_status_change(&email, status.as_str()).await {
            warn!(error = %e, %requester_id, "Status notification failed");
        }
    });
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/organizations/{org_id}/reimbursements` - List requests.
async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListRequestsQuery>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match RequestStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "UNKNOWN_STATUS",
                    &format!("Unknown reimbursement status: {raw}"),
                );
            }
        },
    };

    let repo = ReimbursementRepository::new((*state.db).clone());
    match repo.list_requests(org_id, status).await {
        Ok(requests) => {
            let items: Vec<RequestResponse> = requests
                .into_iter()
                .map(RequestResponse::from_model)
                .collect();
            (StatusCode::OK, Json(json!({ "reimbursements": items }))).into_response()
        }
        Err(e) => reimbursement_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/reimbursements` - Create a request.
async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(body): Json<CreateReimbursementRequest>,
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

    let repo = ReimbursementRepository::new((*state.db).clone());
    let input = CreateRequestInput {
        organization_id: org_id,
        user_id: auth.user_id(),
        account_id: body.account_id,
        amount_cents,
        purpose: body.purpose,
        receipt_ids: body.receipt_ids,
    };

    match repo.create_request(input).await {
        Ok(created) => {
            info!(request_id = %created.request.id, amount_cents, "Reimbursement requested");
            (
                StatusCode::CREATED,
                Json(json!({
                    "request": RequestResponse::from_model(created.request),
                    "receipts": receipt_responses(created.receipts),
                })),
            )
                .into_response()
        }
        Err(e) => reimbursement_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/reimbursements/{request_id}` - Get a
/// request with its receipts and, when approved, the spawned transaction.
async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, request_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = ReimbursementRepository::new((*state.db).clone());
    let detail = match repo.get_request(org_id, request_id).await {
        Ok(detail) => detail,
        Err(e) => return reimbursement_error_response(&e),
    };

    let spawned = match repo.spawned_transaction(org_id, request_id).await {
        Ok(spawned) => spawned,
        Err(e) => return reimbursement_error_response(&e),
    };

    (
        StatusCode::OK,
        Json(json!({
            "request": RequestResponse::from_model(detail.request),
            "receipts": receipt_responses(detail.receipts),
            "transaction_id": spawned.map(|t| t.id),
        })),
    )
        .into_response()
}

/// POST `/organizations/{org_id}/reimbursements/{request_id}/status` -
/// Apply a status transition.
async fn transition_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, request_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<TransitionRequestBody>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let Some(target) = RequestStatus::parse(&body.status) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "UNKNOWN_STATUS",
            &format!("Unknown reimbursement status: {}", body.status),
        );
    };

    let approval = if target == RequestStatus::Approved {
        let Some(raw_amount) = body.amount.as_deref() else {
            return json_error(
                StatusCode::BAD_REQUEST,
                "AMOUNT_REQUIRED",
                "An amount is required to approve a reimbursement",
            );
        };
        let amount_cents = match parse_dollars(raw_amount) {
            Ok(cents) => cents,
            Err(e) => {
                return json_error(StatusCode::BAD_REQUEST, "INVALID_AMOUNT", &e.to_string());
            }
        };
        Some(ApproveInput {
            amount_cents,
            account_id: body.account_id,
            category_id: body.category_id,
            note: body.note.clone(),
        })
    } else {
        None
    };

    let ctx = TransitionContext {
        approval,
        note: body.note,
    };

    let repo = ReimbursementRepository::new((*state.db).clone());
    match repo
        .transition(org_id, request_id, target, auth.user_id(), ctx)
        .await
    {
        Ok(PostingOutcome::Completed(applied)) => {
            info!(
                %request_id,
                status = %target,
                posted = applied.posting.is_some(),
                "Reimbursement transition applied"
            );
            notify_requester(&state, applied.request.user_id, target);

            (
                StatusCode::OK,
                Json(json!({
                    "request": RequestResponse::from_model(applied.request),
                    "transaction": applied.posting.map(TransactionResponse::from_record),
                })),
            )
                .into_response()
        }
        Ok(PostingOutcome::InsufficientFunds(short)) => {
            // The request stays pending and nothing was written; the UI
            // renders this inline next to the approval form.
            json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_FUNDS",
                &short.user_message(),
            )
        }
        Err(e) => reimbursement_error_response(&e),
    }
}
