//! Database seeder for Bursar development and testing.
//!
//! Seeds a test user, organization, membership, fund accounts, and a
//! contact for local development. Global reference data (item types,
//! methods, categories, account types) is seeded by the initial migration.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use bursar_db::entities::{
    account_types, accounts, contacts, organization_users, organizations, users,
};

/// Test organization ID (consistent for all seeds)
const TEST_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test user ID (consistent for all seeds)
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = bursar_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test user...");
    seed_test_user(&db).await;

    println!("Seeding test organization...");
    seed_test_organization(&db).await;

    println!("Seeding membership...");
    seed_membership(&db).await;

    println!("Seeding fund accounts...");
    seed_accounts(&db).await;

    println!("Seeding contact...");
    seed_contact(&db).await;

    println!("Seeding complete!");
}

fn test_org_id() -> Uuid {
    Uuid::parse_str(TEST_ORG_ID).unwrap()
}

fn test_user_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

/// Seeds a test user for development.
async fn seed_test_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(test_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test user already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(test_user_id()),
        subject: Set("dev|treasurer".to_string()),
        email: Set("treasurer@bursar.dev".to_string()),
        full_name: Set("Test Treasurer".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to seed test user");
}

/// Seeds a test organization.
async fn seed_test_organization(db: &DatabaseConnection) {
    if organizations::Entity::find_by_id(test_org_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test organization already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let org = organizations::ActiveModel {
        id: Set(test_org_id()),
        name: Set("Riverbend Community Fund".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    org.insert(db).await.expect("Failed to seed organization");
}

/// Makes the test user a treasurer of the test organization.
async fn seed_membership(db: &DatabaseConnection) {
    let existing = organization_users::Entity::find()
        .filter(organization_users::Column::OrganizationId.eq(test_org_id()))
        .filter(organization_users::Column::UserId.eq(test_user_id()))
        .one(db)
        .await
        .ok()
        .flatten();

    if existing.is_some() {
        println!("  Membership already exists, skipping...");
        return;
    }

    let membership = organization_users::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(test_org_id()),
        user_id: Set(test_user_id()),
        role: Set("treasurer".to_string()),
        created_at: Set(Utc::now().into()),
    };
    membership
        .insert(db)
        .await
        .expect("Failed to seed membership");
}

/// Seeds a general fund and a building fund account.
async fn seed_accounts(db: &DatabaseConnection) {
    let operating_type = account_types::Entity::find()
        .filter(account_types::Column::Name.eq("Operating"))
        .filter(account_types::Column::OrganizationId.is_null())
        .one(db)
        .await
        .expect("Failed to look up account types")
        .expect("Global 'Operating' account type missing - run migrations first");

    for (code, description) in [("GEN", "General fund"), ("BLD", "Building fund")] {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(test_org_id()))
            .filter(accounts::Column::Code.eq(code))
            .one(db)
            .await
            .ok()
            .flatten();

        if existing.is_some() {
            println!("  Account {code} already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(test_org_id()),
            code: Set(code.to_string()),
            description: Set(description.to_string()),
            type_id: Set(operating_type.id),
            user_id: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        account.insert(db).await.expect("Failed to seed account");
    }
}

/// Seeds a sample donor contact.
async fn seed_contact(db: &DatabaseConnection) {
    let existing = contacts::Entity::find()
        .filter(contacts::Column::OrganizationId.eq(test_org_id()))
        .filter(contacts::Column::Name.eq("Dana Whitfield"))
        .one(db)
        .await
        .ok()
        .flatten();

    if existing.is_some() {
        println!("  Contact already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let contact = contacts::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(test_org_id()),
        name: Set("Dana Whitfield".to_string()),
        email: Set(Some("dana@example.org".to_string())),
        phone: Set(None),
        notes: Set(Some("Annual gala sponsor".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    };
    contact.insert(db).await.expect("Failed to seed contact");
}
