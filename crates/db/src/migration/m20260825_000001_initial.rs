//! Initial database migration.
//!
//! Creates all enums, tables, check constraints, and indexes for the
//! Curafin schema. Ledger tables (budgets, expenses, invoices, payments)
//! carry a `BIGSERIAL` internal id used for serial number allocation plus
//! a unique `uid` used by every foreign key and API surface. Reference
//! tables (users, departments, expense categories) are keyed by uid alone.

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
        // PART 2: REFERENCE TABLES
        // ============================================================
        db.execute_unprepared(DEPARTMENTS_SQL).await?;
        db.execute_unprepared(EXPENSE_CATEGORIES_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: BUDGET LEDGER
        // ============================================================
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 4: INVOICE LEDGER
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

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
-- User roles
CREATE TYPE user_role AS ENUM ('admin', 'staff');

-- Soft activation state for reference records
CREATE TYPE record_status AS ENUM ('ACTIVE', 'IN_ACTIVE');

-- Budget approval state
CREATE TYPE budget_status AS ENUM ('PENDING', 'APPROVED', 'REJECTED');

-- Budget availability for spending
CREATE TYPE budget_availability AS ENUM (
    'AVAILABLE',
    'FROZEN',
    'DEPLETED',
    'RESERVED'
);

-- Invoice classification
CREATE TYPE invoice_type AS ENUM (
    'SERVICE',
    'PRODUCT',
    'SUBSCRIPTION',
    'MAINTENANCE',
    'PATIENT',
    'INSURANCE',
    'GOVERNMENT_GRANT',
    'DONATION',
    'OTHERS'
);

-- Payment settlement method
CREATE TYPE payment_method AS ENUM (
    'CASH',
    'CARD',
    'BANK_TRANSFER',
    'INSURANCE',
    'OTHERS'
);
";

const DEPARTMENTS_SQL: &str = r"
CREATE TABLE departments (
    uid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    status record_status NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_departments_status ON departments(status);
";

const EXPENSE_CATEGORIES_SQL: &str = r"
CREATE TABLE expense_categories (
    uid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    status record_status NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_expense_categories_status ON expense_categories(status);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    uid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'staff',
    department_uid UUID REFERENCES departments(uid),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email);
CREATE INDEX idx_users_department ON users(department_uid)
    WHERE department_uid IS NOT NULL;
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id BIGSERIAL PRIMARY KEY,
    uid UUID NOT NULL UNIQUE DEFAULT gen_random_uuid(),
    serial_no VARCHAR(30),
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    gross_amount NUMERIC(12,2) NOT NULL,
    amount_remaining NUMERIC(12,2) NOT NULL,
    status budget_status NOT NULL DEFAULT 'PENDING',
    availability budget_availability NOT NULL DEFAULT 'AVAILABLE',
    department_uid UUID NOT NULL REFERENCES departments(uid),
    user_uid UUID NOT NULL REFERENCES users(uid),
    approver_uid UUID REFERENCES users(uid),
    assignee_uid UUID REFERENCES users(uid),
    received_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    approved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_budgets_gross_minimum CHECK (gross_amount >= 1000)
);

CREATE UNIQUE INDEX uq_budgets_serial_no ON budgets(serial_no)
    WHERE serial_no IS NOT NULL;
CREATE INDEX idx_budgets_department ON budgets(department_uid);
CREATE INDEX idx_budgets_user ON budgets(user_uid);
CREATE INDEX idx_budgets_assignee ON budgets(assignee_uid)
    WHERE assignee_uid IS NOT NULL;
CREATE INDEX idx_budgets_created_at ON budgets(created_at);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id BIGSERIAL PRIMARY KEY,
    uid UUID NOT NULL UNIQUE DEFAULT gen_random_uuid(),
    serial_no VARCHAR(30),
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    note TEXT,
    amount_spent NUMERIC(12,2) NOT NULL,
    budget_uid UUID NOT NULL REFERENCES budgets(uid) ON DELETE CASCADE,
    category_uid UUID NOT NULL REFERENCES expense_categories(uid),
    user_uid UUID NOT NULL REFERENCES users(uid),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_expenses_amount_positive CHECK (amount_spent > 0)
);

CREATE UNIQUE INDEX uq_expenses_serial_no ON expenses(serial_no)
    WHERE serial_no IS NOT NULL;
CREATE INDEX idx_expenses_budget ON expenses(budget_uid);
CREATE INDEX idx_expenses_category ON expenses(category_uid);
CREATE INDEX idx_expenses_created_at ON expenses(created_at);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id BIGSERIAL PRIMARY KEY,
    uid UUID NOT NULL UNIQUE DEFAULT gen_random_uuid(),
    serial_no VARCHAR(30),
    title VARCHAR(255) NOT NULL,
    gross_amount NUMERIC(12,2) NOT NULL,
    tax_percent NUMERIC(5,2) NOT NULL DEFAULT 0,
    discount_percent NUMERIC(5,2) NOT NULL DEFAULT 0,
    invoice_type invoice_type NOT NULL,
    invoiced_at TIMESTAMPTZ,
    department_uid UUID REFERENCES departments(uid),
    service_uid UUID,
    patient_uid UUID,
    user_uid UUID NOT NULL REFERENCES users(uid),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_invoices_gross_nonnegative CHECK (gross_amount >= 0),
    CONSTRAINT chk_invoices_tax_percent
        CHECK (tax_percent >= 0 AND tax_percent <= 100),
    CONSTRAINT chk_invoices_discount_percent
        CHECK (discount_percent >= 0 AND discount_percent <= 100)
);

CREATE UNIQUE INDEX uq_invoices_serial_no ON invoices(serial_no)
    WHERE serial_no IS NOT NULL;
CREATE INDEX idx_invoices_type ON invoices(invoice_type);
CREATE INDEX idx_invoices_user ON invoices(user_uid);
CREATE INDEX idx_invoices_created_at ON invoices(created_at);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id BIGSERIAL PRIMARY KEY,
    uid UUID NOT NULL UNIQUE DEFAULT gen_random_uuid(),
    serial_no VARCHAR(30),
    invoice_uid UUID NOT NULL REFERENCES invoices(uid) ON DELETE CASCADE,
    amount_received NUMERIC(12,2) NOT NULL,
    payment_method payment_method NOT NULL,
    reference_number VARCHAR(100) NOT NULL DEFAULT '',
    note TEXT,
    user_uid UUID NOT NULL REFERENCES users(uid),
    received_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_payments_amount_positive CHECK (amount_received > 0)
);

CREATE UNIQUE INDEX uq_payments_serial_no ON payments(serial_no)
    WHERE serial_no IS NOT NULL;
CREATE INDEX idx_payments_invoice ON payments(invoice_uid);
CREATE INDEX idx_payments_method ON payments(payment_method);
CREATE INDEX idx_payments_received_at ON payments(received_at);
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS expense_categories CASCADE;
DROP TABLE IF EXISTS departments CASCADE;

-- Drop enums
DROP TYPE IF EXISTS payment_method CASCADE;
DROP TYPE IF EXISTS invoice_type CASCADE;
DROP TYPE IF EXISTS budget_availability CASCADE;
DROP TYPE IF EXISTS budget_status CASCADE;
DROP TYPE IF EXISTS record_status CASCADE;
DROP TYPE IF EXISTS user_role CASCADE;
";
