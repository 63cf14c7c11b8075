//! Reference-data routes.
//!
//! Read-only listings of the lookup rows visible to an organization
//! (org-specific rows plus global defaults, already merged by the
//! repository). The posting forms use these to populate their selects.

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
use bursar_core::posting::Direction;
use bursar_db::LookupRepository;

use super::{check_membership, internal_error};

/// Creates the lookup routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/item-types", get(list_item_types))
        .route(
            "/organizations/{org_id}/item-methods",
            get(list_item_methods),
        )
        .route("/organizations/{org_id}/categories", get(list_categories))
        .route(
            "/organizations/{org_id}/account-types",
            get(list_account_types),
        )
}

/// Response for an item type.
#[derive(Debug, Serialize)]
pub struct ItemTypeResponse {
    /// Item type ID.
    pub id: Uuid,
    /// Item type name.
    pub name: String,
    /// Direction: "in" or "out".
    pub direction: &'static str,
}

/// Response for a named lookup row.
#[derive(Debug, Serialize)]
pub struct NamedLookupResponse {
    /// Row ID.
    pub id: Uuid,
    /// Row name.
    pub name: String,
}

/// GET `/organizations/{org_id}/item-types`
async fn list_item_types(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = LookupRepository::new((*state.db).clone());
    match repo.item_types(org_id).await {
        Ok(rows) => {
            let items: Vec<ItemTypeResponse> = rows
                .into_iter()
                .map(|row| ItemTypeResponse {
                    id: row.id,
                    name: row.name,
                    direction: Direction::from(row.direction).as_str(),
                })
                .collect();
            (StatusCode::OK, Json(json!({ "item_types": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// GET `/organizations/{org_id}/item-methods`
async fn list_item_methods(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = LookupRepository::new((*state.db).clone());
    match repo.item_methods(org_id).await {
        Ok(rows) => {
            let items: Vec<NamedLookupResponse> = rows
                .into_iter()
                .map(|row| NamedLookupResponse {
                    id: row.id,
                    name: row.name,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "item_methods": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// GET `/organizations/{org_id}/categories`
async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = LookupRepository::new((*state.db).clone());
    match repo.categories(org_id).await {
        Ok(rows) => {
            let items: Vec<NamedLookupResponse> = rows
                .into_iter()
                .map(|row| NamedLookupResponse {
                    id: row.id,
                    name: row.name,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "categories": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// GET `/organizations/{org_id}/account-types`
async fn list_account_types(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = LookupRepository::new((*state.db).clone());
    match repo.account_types(org_id).await {
        Ok(rows) => {
            let items: Vec<NamedLookupResponse> = rows
                .into_iter()
                .map(|row| NamedLookupResponse {
                    id: row.id,
                    name: row.name,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "account_types": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}
