//! Organization repository for tenancy and membership checks.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{organization_users, organizations, users};

/// A member of an organization with their user record.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    /// The membership row (carries the role).
    pub membership: organization_users::Model,
    /// The member's user record.
    pub user: users::Model,
}

/// Organization repository.
#[derive(Debug)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets an organization by ID.
    pub async fn get(&self, organization_id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(organization_id)
            .one(&self.db)
            .await
    }

    /// Checks whether a user is a member of an organization.
    ///
    /// Every org-scoped route guards on this before touching data.
    pub async fn is_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let membership = organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(organization_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(membership.is_some())
    }

    /// Lists an organization's members with their user records.
    pub async fn members(&self, organization_id: Uuid) -> Result<Vec<MemberRecord>, DbErr> {
        let rows = organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(organization_id))
            .find_also_related(users::Entity)
            .order_by_asc(organization_users::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, user)| user.map(|user| MemberRecord { membership, user }))
            .collect())
    }
}
