//! Contact and engagement routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use bursar_db::entities::{contacts, engagements};
use bursar_db::repositories::contact::{
    ContactError, ContactRepository, CreateContactInput, CreateEngagementInput,
};

use super::{check_membership, internal_error, json_error};

/// Creates the contact routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/contacts",
            get(list_contacts).post(create_contact),
        )
        .route(
            "/organizations/{org_id}/contacts/{contact_id}",
            get(get_contact).patch(update_contact),
        )
        .route(
            "/organizations/{org_id}/contacts/{contact_id}/engagements",
            get(list_engagements).post(add_engagement),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a contact.
#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    /// Contact name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating a contact. `null` clears an optional field.
#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    /// Contact name.
    pub name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<Option<String>>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<Option<String>>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<Option<String>>,
}

/// Request body for logging an engagement.
#[derive(Debug, Deserialize)]
pub struct CreateEngagementRequest {
    /// Kind of interaction (call, visit, letter, ...).
    pub kind: String,
    /// Optional note.
    pub note: Option<String>,
    /// When the interaction happened (YYYY-MM-DD).
    pub occurred_at: NaiveDate,
}

/// Response for a contact.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    /// Contact ID.
    pub id: Uuid,
    /// Contact name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
}

impl ContactResponse {
    fn from_model(contact: contacts::Model) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            notes: contact.notes,
            created_at: contact.created_at.to_rfc3339(),
        }
    }
}

/// Response for an engagement.
#[derive(Debug, Serialize)]
pub struct EngagementResponse {
    /// Engagement ID.
    pub id: Uuid,
    /// Kind of interaction.
    pub kind: String,
    /// Note.
    pub note: Option<String>,
    /// When the interaction happened.
    pub occurred_at: String,
}

impl EngagementResponse {
    fn from_model(engagement: engagements::Model) -> Self {
        Self {
            id: engagement.id,
            kind: engagement.kind,
            note: engagement.note,
            occurred_at: engagement.occurred_at.to_string(),
        }
    }
}

/// Maps a contact error onto an HTTP response.
fn contact_error_response(e: &ContactError) -> Response {
    match e {
        ContactError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "CONTACT_NOT_FOUND", &e.to_string())
        }
        ContactError::Database(_) => internal_error(e),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/organizations/{org_id}/contacts` - List contacts.
async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = ContactRepository::new((*state.db).clone());
    match repo.list_contacts(org_id).await {
        Ok(rows) => {
            let items: Vec<ContactResponse> =
                rows.into_iter().map(ContactResponse::from_model).collect();
            (StatusCode::OK, Json(json!({ "contacts": items }))).into_response()
        }
        Err(e) => contact_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/contacts/{contact_id}` - Get a contact.
async fn get_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, contact_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = ContactRepository::new((*state.db).clone());
    match repo.get_contact(org_id, contact_id).await {
        Ok(contact) => (StatusCode::OK, Json(ContactResponse::from_model(contact))).into_response(),
        Err(e) => contact_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/contacts` - Create a contact.
async fn create_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(body): Json<CreateContactRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    if body.name.trim().is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_NAME",
            "Contact name cannot be empty",
        );
    }

    let repo = ContactRepository::new((*state.db).clone());
    let input = CreateContactInput {
        organization_id: org_id,
        name: body.name,
        email: body.email,
        phone: body.phone,
        notes: body.notes,
    };

    match repo.create_contact(input).await {
        Ok(contact) => {
            info!(contact_id = %contact.id, "Contact created");
            (StatusCode::CREATED, Json(ContactResponse::from_model(contact))).into_response()
        }
        Err(e) => contact_error_response(&e),
    }
}

/// PATCH `/organizations/{org_id}/contacts/{contact_id}` - Update a
/// contact.
async fn update_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, contact_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateContactRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = ContactRepository::new((*state.db).clone());
    match repo
        .update_contact(
            org_id,
            contact_id,
            body.name,
            body.email,
            body.phone,
            body.notes,
        )
        .await
    {
        Ok(contact) => (StatusCode::OK, Json(ContactResponse::from_model(contact))).into_response(),
        Err(e) => contact_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/contacts/{contact_id}/engagements` - List
/// a contact's engagements.
async fn list_engagements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, contact_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = ContactRepository::new((*state.db).clone());
    match repo.list_engagements(org_id, contact_id).await {
        Ok(rows) => {
            let items: Vec<EngagementResponse> = rows
                .into_iter()
                .map(EngagementResponse::from_model)
                .collect();
            (StatusCode::OK, Json(json!({ "engagements": items }))).into_response()
        }
        Err(e) => contact_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/contacts/{contact_id}/engagements` - Log
/// an engagement.
async fn add_engagement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, contact_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<CreateEngagementRequest>,
) -> impl IntoResponse {
    if let Err(response) = check_membership(&state.db, org_id, auth.user_id()).await {
        return response;
    }

    let repo = ContactRepository::new((*state.db).clone());
    let input = CreateEngagementInput {
        kind: body.kind,
        note: body.note,
        occurred_at: body.occurred_at,
    };

    match repo.add_engagement(org_id, contact_id, input).await {
        Ok(engagement) => (
            StatusCode::CREATED,
            Json(EngagementResponse::from_model(engagement)),
        )
            .into_response(),
        Err(e) => contact_error_response(&e),
    }
}
