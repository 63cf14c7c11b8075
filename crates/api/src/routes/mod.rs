//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::auth::auth_middleware};
use bursar_db::OrganizationRepository;

pub mod accounts;
pub mod contacts;
pub mod health;
pub mod lookups;
pub mod organizations;
pub mod reimbursements;
pub mod transactions;

/// Creates the API router with protected routes that need state for
/// middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(organizations::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(reimbursements::routes())
        .merge(contacts::routes())
        .merge(lookups::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Builds a JSON error response.
pub(crate) fn json_error(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

/// Builds the generic 500 response and logs the underlying error.
pub(crate) fn internal_error<E: std::fmt::Display>(e: &E) -> Response {
    error!(error = %e, "Request failed with an internal error");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An error occurred",
    )
}

/// Rejects callers that are not members of the organization.
///
/// Every org-scoped handler guards on this before touching data.
pub(crate) async fn check_membership(
    db: &DatabaseConnection,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<(), Response> {
    let org_repo = OrganizationRepository::new(db.clone());

    match org_repo.is_member(organization_id, user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(json_error(
            StatusCode::FORBIDDEN,
            "not_a_member",
            "You are not a member of this organization",
        )),
        Err(e) => Err(internal_error(&e)),
    }
}
