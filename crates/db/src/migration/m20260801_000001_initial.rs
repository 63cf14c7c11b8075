//! Initial database migration.
//!
//! Creates all core tables, enums, indexes, and the global default
//! reference rows (item types, methods, categories, account types).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: IDENTITY & TENANCY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_USERS_SQL).await?;

        // ============================================================
        // PART 3: REFERENCE DATA
        // ============================================================
        db.execute_unprepared(ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(TRANSACTION_CATEGORIES_SQL).await?;
        db.execute_unprepared(TRANSACTION_ITEM_TYPES_SQL).await?;
        db.execute_unprepared(TRANSACTION_ITEM_METHODS_SQL).await?;

        // ============================================================
        // PART 4: ACCOUNTS & CONTACTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(CONTACTS_SQL).await?;
        db.execute_unprepared(ENGAGEMENTS_SQL).await?;

        // ============================================================
        // PART 5: REIMBURSEMENTS & LEDGER
        // ============================================================
        db.execute_unprepared(REIMBURSEMENT_REQUESTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_ITEMS_SQL).await?;
        db.execute_unprepared(RECEIPTS_SQL).await?;

        // ============================================================
        // PART 6: INDEXES
        // ============================================================
        db.execute_unprepared(INDEXES_SQL).await?;

        // ============================================================
        // PART 7: SEED DATA (global defaults)
        // ============================================================
        db.execute_unprepared(SEED_REFERENCE_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Transaction item type direction: the sole source of truth for amount sign
CREATE TYPE item_direction AS ENUM ('in', 'out');

-- Reimbursement request lifecycle
CREATE TYPE reimbursement_status AS ENUM ('pending', 'approved', 'rejected', 'void');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    subject VARCHAR(255) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATION_USERS_SQL: &str = r"
CREATE TABLE organization_users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role VARCHAR(32) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, user_id)
);
";

const ACCOUNT_TYPES_SQL: &str = r"
-- NULL organization_id marks a global default row
CREATE TABLE account_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(128) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, name)
);
CREATE UNIQUE INDEX uq_account_types_global_name
    ON account_types(name) WHERE organization_id IS NULL;
";

const TRANSACTION_CATEGORIES_SQL: &str = r"
CREATE TABLE transaction_categories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(128) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, name)
);
CREATE UNIQUE INDEX uq_transaction_categories_global_name
    ON transaction_categories(name) WHERE organization_id IS NULL;
";

const TRANSACTION_ITEM_TYPES_SQL: &str = r"
CREATE TABLE transaction_item_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(128) NOT NULL,
    direction item_direction NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, name)
);
CREATE UNIQUE INDEX uq_transaction_item_types_global_name
    ON transaction_item_types(name) WHERE organization_id IS NULL;
";

const TRANSACTION_ITEM_METHODS_SQL: &str = r"
CREATE TABLE transaction_item_methods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(128) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, name)
);
CREATE UNIQUE INDEX uq_transaction_item_methods_global_name
    ON transaction_item_methods(name) WHERE organization_id IS NULL;
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    code VARCHAR(32) NOT NULL,
    description VARCHAR(255) NOT NULL,
    type_id UUID NOT NULL REFERENCES account_types(id),
    user_id UUID REFERENCES users(id) ON DELETE SET NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, code)
);
";

const CONTACTS_SQL: &str = r"
CREATE TABLE contacts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(64),
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ENGAGEMENTS_SQL: &str = r"
CREATE TABLE engagements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    contact_id UUID NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    kind VARCHAR(64) NOT NULL,
    note TEXT,
    occurred_at DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const REIMBURSEMENT_REQUESTS_SQL: &str = r"
CREATE TABLE reimbursement_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    account_id UUID REFERENCES accounts(id),
    amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
    purpose TEXT,
    status reimbursement_status NOT NULL DEFAULT 'pending',
    approver_note TEXT,
    decided_by UUID REFERENCES users(id),
    decided_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSACTIONS_SQL: &str = r"
-- Balance is never stored: it is SUM(amount_cents) per account
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    amount_cents BIGINT NOT NULL,
    date DATE NOT NULL,
    description TEXT,
    category_id UUID REFERENCES transaction_categories(id),
    contact_id UUID REFERENCES contacts(id) ON DELETE SET NULL,
    reimbursement_request_id UUID REFERENCES reimbursement_requests(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSACTION_ITEMS_SQL: &str = r"
-- Items are owned by their transaction: created together, deleted together
CREATE TABLE transaction_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    type_id UUID NOT NULL REFERENCES transaction_item_types(id),
    method_id UUID NOT NULL REFERENCES transaction_item_methods(id),
    amount_cents BIGINT NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const RECEIPTS_SQL: &str = r"
CREATE TABLE receipts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    reimbursement_request_id UUID REFERENCES reimbursement_requests(id) ON DELETE SET NULL,
    transaction_id UUID REFERENCES transactions(id) ON DELETE SET NULL,
    object_key VARCHAR(512) NOT NULL,
    filename VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_transactions_account ON transactions(account_id);
CREATE INDEX idx_transactions_org_date ON transactions(organization_id, date DESC);
CREATE INDEX idx_transactions_reimbursement
    ON transactions(reimbursement_request_id)
    WHERE reimbursement_request_id IS NOT NULL;
CREATE INDEX idx_transaction_items_transaction ON transaction_items(transaction_id);
CREATE INDEX idx_reimbursements_org_status ON reimbursement_requests(organization_id, status);
CREATE INDEX idx_engagements_contact ON engagements(contact_id);
CREATE INDEX idx_receipts_request ON receipts(reimbursement_request_id);
CREATE INDEX idx_accounts_org ON accounts(organization_id);
CREATE INDEX idx_contacts_org ON contacts(organization_id);
";

const SEED_REFERENCE_SQL: &str = r"
-- Global default reference rows (organization_id IS NULL)
INSERT INTO transaction_item_types (organization_id, name, direction) VALUES
    (NULL, 'Donation_In', 'in'),
    (NULL, 'Grant_In', 'in'),
    (NULL, 'Expense_Out', 'out'),
    (NULL, 'Fee_Out', 'out'),
    (NULL, 'Other_Incoming', 'in'),
    (NULL, 'Other_Outgoing', 'out'),
    (NULL, 'Transfer_In', 'in'),
    (NULL, 'Transfer_Out', 'out');

INSERT INTO transaction_item_methods (organization_id, name) VALUES
    (NULL, 'Cash'),
    (NULL, 'Check'),
    (NULL, 'Card'),
    (NULL, 'Transfer'),
    (NULL, 'Other');

INSERT INTO transaction_categories (organization_id, name) VALUES
    (NULL, 'general'),
    (NULL, 'reimbursement'),
    (NULL, 'internal-transfer-gain'),
    (NULL, 'internal-transfer-loss');

INSERT INTO account_types (organization_id, name) VALUES
    (NULL, 'Operating'),
    (NULL, 'Fund'),
    (NULL, 'Member');
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS receipts CASCADE;
DROP TABLE IF EXISTS transaction_items CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS reimbursement_requests CASCADE;
DROP TABLE IF EXISTS engagements CASCADE;
DROP TABLE IF EXISTS contacts CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS transaction_item_methods CASCADE;
DROP TABLE IF EXISTS transaction_item_types CASCADE;
DROP TABLE IF EXISTS transaction_categories CASCADE;
DROP TABLE IF EXISTS account_types CASCADE;
DROP TABLE IF EXISTS organization_users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS reimbursement_status;
DROP TYPE IF EXISTS item_direction;
";
