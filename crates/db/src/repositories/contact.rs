//! Contact repository for donor/contact management.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{contacts, engagements};

/// Error types for contact operations.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// Contact not found.
    #[error("Contact not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a contact.
#[derive(Debug, Clone)]
pub struct CreateContactInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Contact name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for logging an engagement with a contact.
#[derive(Debug, Clone)]
pub struct CreateEngagementInput {
    /// Kind of interaction (call, visit, letter, ...).
    pub kind: String,
    /// Optional note.
    pub note: Option<String>,
    /// When the interaction happened.
    pub occurred_at: NaiveDate,
}

/// Contact repository for CRUD and engagement logging.
#[derive(Debug)]
pub struct ContactRepository {
    db: DatabaseConnection,
}

impl ContactRepository {
    /// Creates a new contact repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a contact.
    pub async fn create_contact(
        &self,
        input: CreateContactInput,
    ) -> Result<contacts::Model, ContactError> {
        let now = Utc::now().into();
        let contact = contacts::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(input.organization_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(contact.insert(&self.db).await?)
    }

    /// Lists an organization's contacts by name.
    pub async fn list_contacts(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<contacts::Model>, ContactError> {
        Ok(contacts::Entity::find()
            .filter(contacts::Column::OrganizationId.eq(organization_id))
            .order_by_asc(contacts::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Gets a contact.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` if it does not exist in the
    /// organization.
    pub async fn get_contact(
        &self,
        organization_id: Uuid,
        contact_id: Uuid,
    ) -> Result<contacts::Model, ContactError> {
        contacts::Entity::find_by_id(contact_id)
            .filter(contacts::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(ContactError::NotFound(contact_id))
    }

    /// Updates a contact's details.
    pub async fn update_contact(
        &self,
        organization_id: Uuid,
        contact_id: Uuid,
        name: Option<String>,
        email: Option<Option<String>>,
        phone: Option<Option<String>>,
        notes: Option<Option<String>>,
    ) -> Result<contacts::Model, ContactError> {
        let contact = self.get_contact(organization_id, contact_id).await?;

        let mut active: contacts::ActiveModel = contact.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        if let Some(phone) = phone {
            active.phone = Set(phone);
        }
        if let Some(notes) = notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Logs an engagement with a contact.
    pub async fn add_engagement(
        &self,
        organization_id: Uuid,
        contact_id: Uuid,
        input: CreateEngagementInput,
    ) -> Result<engagements::Model, ContactError> {
        // Guards tenancy as well as existence.
        self.get_contact(organization_id, contact_id).await?;

        let engagement = engagements::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            contact_id: Set(contact_id),
            kind: Set(input.kind),
            note: Set(input.note),
            occurred_at: Set(input.occurred_at),
            created_at: Set(Utc::now().into()),
        };

        Ok(engagement.insert(&self.db).await?)
    }

    /// Lists a contact's engagements, newest first.
    pub async fn list_engagements(
        &self,
        organization_id: Uuid,
        contact_id: Uuid,
    ) -> Result<Vec<engagements::Model>, ContactError> {
        self.get_contact(organization_id, contact_id).await?;

        Ok(engagements::Entity::find()
            .filter(engagements::Column::ContactId.eq(contact_id))
            .order_by_desc(engagements::Column::OccurredAt)
            .all(&self.db)
            .await?)
    }
}
