//! Reference-data lookups.
//!
//! Lookup tables conflate org-specific rows and global defaults behind a
//! nullable `organization_id`. Every query here is parameterized by org id
//! and returns the union, so the null-tenancy convention never leaks to
//! callers. When an org row and a global row share a name, the org row
//! wins.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use bursar_core::posting::ItemTypeRef;

use crate::entities::{
    account_types, transaction_categories, transaction_item_methods, transaction_item_types,
};

/// Names of the globally seeded reference rows the posting flows depend on.
pub mod well_known {
    /// Item type for the incoming side of a transfer.
    pub const TRANSFER_IN: &str = "Transfer_In";
    /// Item type for the outgoing side of a transfer.
    pub const TRANSFER_OUT: &str = "Transfer_Out";
    /// Item type for reimbursement approval postings.
    pub const OTHER_OUTGOING: &str = "Other_Outgoing";
    /// Item method for transfer postings.
    pub const METHOD_TRANSFER: &str = "Transfer";
    /// Item method for reimbursement approval postings.
    pub const METHOD_OTHER: &str = "Other";
    /// Category for the incoming side of a transfer.
    pub const CATEGORY_TRANSFER_GAIN: &str = "internal-transfer-gain";
    /// Category for the outgoing side of a transfer.
    pub const CATEGORY_TRANSFER_LOSS: &str = "internal-transfer-loss";
    /// Category for reimbursement approval postings.
    pub const CATEGORY_REIMBURSEMENT: &str = "reimbursement";
}

/// Repository for org-scoped reference data.
#[derive(Debug)]
pub struct LookupRepository {
    db: DatabaseConnection,
}

impl LookupRepository {
    /// Creates a new lookup repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the item types visible to an organization.
    pub async fn item_types(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<transaction_item_types::Model>, DbErr> {
        item_types_visible_to(&self.db, organization_id).await
    }

    /// Lists the item types visible to an organization as core lookup refs.
    pub async fn item_type_refs(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<ItemTypeRef>, DbErr> {
        let rows = self.item_types(organization_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| ItemTypeRef {
                id: row.id,
                name: row.name,
                direction: row.direction.into(),
            })
            .collect())
    }

    /// Lists the item methods visible to an organization.
    pub async fn item_methods(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<transaction_item_methods::Model>, DbErr> {
        transaction_item_methods::Entity::find()
            .filter(
                transaction_item_methods::Column::OrganizationId
                    .eq(organization_id)
                    .or(transaction_item_methods::Column::OrganizationId.is_null()),
            )
            .order_by_asc(transaction_item_methods::Column::Name)
            .all(&self.db)
            .await
    }

    /// Lists the transaction categories visible to an organization.
    pub async fn categories(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<transaction_categories::Model>, DbErr> {
        transaction_categories::Entity::find()
            .filter(
                transaction_categories::Column::OrganizationId
                    .eq(organization_id)
                    .or(transaction_categories::Column::OrganizationId.is_null()),
            )
            .order_by_asc(transaction_categories::Column::Name)
            .all(&self.db)
            .await
    }

    /// Lists the account types visible to an organization.
    pub async fn account_types(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<account_types::Model>, DbErr> {
        account_types::Entity::find()
            .filter(
                account_types::Column::OrganizationId
                    .eq(organization_id)
                    .or(account_types::Column::OrganizationId.is_null()),
            )
            .order_by_asc(account_types::Column::Name)
            .all(&self.db)
            .await
    }
}

/// Lists the item types visible to an organization on any connection.
pub async fn item_types_visible_to<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
) -> Result<Vec<transaction_item_types::Model>, DbErr> {
    transaction_item_types::Entity::find()
        .filter(
            transaction_item_types::Column::OrganizationId
                .eq(organization_id)
                .or(transaction_item_types::Column::OrganizationId.is_null()),
        )
        .order_by_asc(transaction_item_types::Column::Name)
        .all(conn)
        .await
}

/// Finds an item type by name among the rows visible to an organization,
/// preferring an org-specific row over a global default.
pub async fn find_item_type_by_name<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    name: &str,
) -> Result<Option<transaction_item_types::Model>, DbErr> {
    let mut rows = transaction_item_types::Entity::find()
        .filter(transaction_item_types::Column::Name.eq(name))
        .filter(
            transaction_item_types::Column::OrganizationId
                .eq(organization_id)
                .or(transaction_item_types::Column::OrganizationId.is_null()),
        )
        .all(conn)
        .await?;

    rows.sort_by_key(|row| row.organization_id.is_none());
    Ok(rows.into_iter().next())
}

/// Finds an item method by name among the rows visible to an organization,
/// preferring an org-specific row over a global default.
pub async fn find_method_by_name<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    name: &str,
) -> Result<Option<transaction_item_methods::Model>, DbErr> {
    let mut rows = transaction_item_methods::Entity::find()
        .filter(transaction_item_methods::Column::Name.eq(name))
        .filter(
            transaction_item_methods::Column::OrganizationId
                .eq(organization_id)
                .or(transaction_item_methods::Column::OrganizationId.is_null()),
        )
        .all(conn)
        .await?;

    rows.sort_by_key(|row| row.organization_id.is_none());
    Ok(rows.into_iter().next())
}

/// Finds a transaction category by name among the rows visible to an
/// organization, preferring an org-specific row over a global default.
pub async fn find_category_by_name<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    name: &str,
) -> Result<Option<transaction_categories::Model>, DbErr> {
    let mut rows = transaction_categories::Entity::find()
        .filter(transaction_categories::Column::Name.eq(name))
        .filter(
            transaction_categories::Column::OrganizationId
                .eq(organization_id)
                .or(transaction_categories::Column::OrganizationId.is_null()),
        )
        .all(conn)
        .await?;

    rows.sort_by_key(|row| row.organization_id.is_none());
    Ok(rows.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::ItemDirection;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn item_type_row(
        organization_id: Option<Uuid>,
        name: &str,
        direction: ItemDirection,
    ) -> transaction_item_types::Model {
        transaction_item_types::Model {
            id: Uuid::new_v4(),
            organization_id,
            name: name.to_string(),
            direction,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_item_type_refs_map_direction() {
        let org = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                item_type_row(Some(org), "Donation_In", ItemDirection::In),
                item_type_row(None, "Transfer_Out", ItemDirection::Out),
            ]])
            .into_connection();

        let repo = LookupRepository::new(db);
        let refs = repo.item_type_refs(org).await.unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].direction, bursar_core::posting::Direction::In);
        assert_eq!(refs[1].direction, bursar_core::posting::Direction::Out);
    }

    #[tokio::test]
    async fn test_find_by_name_prefers_org_row() {
        let org = Uuid::new_v4();
        // Both an org-specific and a global row named Transfer_Out; the
        // org-specific one must win regardless of result order.
        let global = item_type_row(None, "Transfer_Out", ItemDirection::Out);
        let scoped = item_type_row(Some(org), "Transfer_Out", ItemDirection::Out);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![global.clone(), scoped.clone()]])
            .into_connection();

        let found = find_item_type_by_name(&db, org, "Transfer_Out")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, scoped.id);
    }

    #[tokio::test]
    async fn test_find_by_name_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<transaction_item_types::Model>::new()])
            .into_connection();

        let found = find_item_type_by_name(&db, Uuid::new_v4(), "No_Such_Type")
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
