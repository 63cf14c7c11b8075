//! User repository.
//!
//! User rows mirror accounts at the hosted identity provider; `subject` is
//! the provider's stable identifier.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::users;

/// User repository.
#[derive(Debug)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(user_id).one(&self.db).await
    }

    /// Finds a user by the identity provider's subject.
    pub async fn find_by_subject(&self, subject: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Subject.eq(subject))
            .one(&self.db)
            .await
    }
}
