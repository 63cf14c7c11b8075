//! Organization administration routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use bursar_db::OrganizationRepository;

use super::{check_membership, internal_error, json_error};

/// Creates the organization routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}", get(get_organization))
        .route("/organizations/{org_id}/members", get(list_members))
}

/// Response for an organization member.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// User ID.
    pub user_id: Uuid,
    /// Member's email.
    pub email: String,
    /// Member's full name.
    pub full_name: String,
    /// Member's role in the organization.
    pub role: String,
}

/// GET `/organizations/{org_id}` - Organization detail.
async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = OrganizationRepository::new((*state.db).clone());
    match repo.get(org_id).await {
        Ok(Some(org)) => (
            StatusCode::OK,
            Json(json!({
                "id": org.id,
                "name": org.name,
                "created_at": org.created_at.to_rfc3339(),
            })),
        )
            .into_response(),
        Ok(None) => json_error(
            StatusCode::NOT_FOUND,
            "ORGANIZATION_NOT_FOUND",
            "Organization not found",
        ),
        Err(e) => internal_error(&e),
    }
}

/// GET `/organizations/{org_id}/members` - List members with roles.
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = OrganizationRepository::new((*state.db).clone());
    match repo.members(org_id).await {
        Ok(members) => {
            let items: Vec<MemberResponse> = members
                .into_iter()
                .map(|member| MemberResponse {
                    user_id: member.user.id,
                    email: member.user.email,
                    full_name: member.user.full_name,
                    role: member.membership.role,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "members": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}
