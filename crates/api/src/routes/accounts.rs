//! Fund account routes.
//!
//! Balances in responses are always derived on read; there is no stored
//! balance to get out of sync.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use bursar_db::repositories::account::{
    AccountError, AccountRepository, AccountWithBalance, CreateAccountInput, UpdateAccountInput,
};
use bursar_shared::types::format_cents;

use super::{check_membership, internal_error, json_error};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/accounts",
            get(list_accounts).post(create_account),
        )
        .route(
            "/organizations/{org_id}/accounts/{account_id}",
            get(get_account).patch(update_account),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account code (unique within the organization).
    pub code: String,
    /// Account description.
    pub description: String,
    /// Account type ID.
    pub type_id: Uuid,
    /// Optional linked user.
    pub user_id: Option<Uuid>,
    /// Whether the account is active (defaults to true).
    pub is_active: Option<bool>,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// Account code.
    pub code: Option<String>,
    /// Account description.
    pub description: Option<String>,
    /// Account type ID.
    pub type_id: Option<Uuid>,
    /// Linked user: absent = unchanged, `null` = unlink, value = link.
    #[serde(default)]
    pub user_id: Option<Option<Uuid>>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
}

/// Response for an account with its derived balance.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account description.
    pub description: String,
    /// Account type ID.
    pub type_id: Uuid,
    /// Linked user.
    pub user_id: Option<Uuid>,
    /// Whether the account is active.
    pub is_active: bool,
    /// Derived balance in cents.
    pub balance_cents: i64,
    /// Derived balance formatted as dollars.
    pub balance: String,
}

impl AccountResponse {
    fn from_record(record: AccountWithBalance) -> Self {
        Self {
            id: record.account.id,
            code: record.account.code,
            description: record.account.description,
            type_id: record.account.type_id,
            user_id: record.account.user_id,
            is_active: record.account.is_active,
            balance_cents: record.balance_cents,
            balance: format_cents(record.balance_cents),
        }
    }
}

/// Maps an account error onto an HTTP response.
fn account_error_response(e: &AccountError) -> Response {
    match e {
        AccountError::DuplicateCode(code) => json_error(
            StatusCode::CONFLICT,
            "DUPLICATE_CODE",
            &format!("Account code '{code}' already exists"),
        ),
        AccountError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND", &e.to_string())
        }
        AccountError::Database(_) => internal_error(e),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/organizations/{org_id}/accounts` - List accounts with balances.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());
    match repo.list_accounts(org_id).await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> = accounts
                .into_iter()
                .map(AccountResponse::from_record)
                .collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/accounts/{account_id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());
    match repo.get_account(org_id, account_id).await {
        Ok(record) => (StatusCode::OK, Json(AccountResponse::from_record(record))).into_response(),
        Err(e) => account_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(body): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    if body.code.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_CODE",
            "Account code cannot be empty",
        );
    }

    let repo = AccountRepository::new((*state.db).clone());
    let input = CreateAccountInput {
        organization_id: org_id,
        code: body.code,
        description: body.description,
        type_id: body.type_id,
        user_id: body.user_id,
        is_active: body.is_active.unwrap_or(true),
    };

    match repo.create_account(input).await {
        Ok(account) => {
            info!(account_id = %account.id, code = %account.code, "Account created");
            (
                StatusCode::CREATED,
                Json(AccountResponse::from_record(AccountWithBalance {
                    account,
                    balance_cents: 0,
                })),
            )
                .into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// PATCH `/organizations/{org_id}/accounts/{account_id}` - Update an
/// account.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, account_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());
    let input = UpdateAccountInput {
        code: body.code,
        description: body.description,
        type_id: body.type_id,
        user_id: body.user_id,
        is_active: body.is_active,
    };

    match repo.update_account(org_id, account_id, input).await {
        Ok(account) => {
            let balance = AccountRepository::new((*state.db).clone())
                .get_account(org_id, account.id)
                .await;
            match balance {
                Ok(record) => {
                    (StatusCode::OK, Json(AccountResponse::from_record(record))).into_response()
                }
                Err(e) => account_error_response(&e),
            }
        }
        Err(e) => account_error_response(&e),
    }
}
