//! Initial database migration.
//!
//! Creates the enums, tables, and indexes for users, teams, expenses,
//! budgets, notifications, and reports.

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
        // PART 2: USERS & TEAMS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(TEAMS_SQL).await?;
        db.execute_unprepared(TEAM_MEMBERS_SQL).await?;

        // ============================================================
        // PART 3: EXPENSES & BUDGETS
        // ============================================================
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(BUDGETS_SQL).await?;

        // ============================================================
        // PART 4: NOTIFICATIONS & REPORTS
        // ============================================================
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;
        db.execute_unprepared(REPORTS_SQL).await?;

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
CREATE TYPE expense_status AS ENUM ('PENDING', 'APPROVED', 'REJECTED');

CREATE TYPE expense_category AS ENUM (
    'travel', 'meals', 'transport', 'office_supplies', 'software',
    'equipment', 'utilities', 'entertainment', 'training', 'other'
);

CREATE TYPE notification_kind AS ENUM (
    'expense_submitted', 'expense_approved', 'expense_rejected',
    'budget_warning', 'budget_exceeded', 'team_added'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_users_email_lowercase CHECK (email = lower(email))
);
";

const TEAMS_SQL: &str = r"
CREATE TABLE teams (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    description TEXT,
    manager_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_teams_manager ON teams(manager_id);
";

const TEAM_MEMBERS_SQL: &str = r"
CREATE TABLE team_members (
    team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    PRIMARY KEY (team_id, user_id)
);

CREATE INDEX idx_team_members_user ON team_members(user_id);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    team_id UUID REFERENCES teams(id) ON DELETE SET NULL,
    amount NUMERIC(19, 4) NOT NULL,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    category expense_category NOT NULL,
    description VARCHAR(500) NOT NULL,
    expense_date DATE NOT NULL,
    status expense_status NOT NULL DEFAULT 'PENDING',
    receipt_url TEXT,
    reviewed_by UUID REFERENCES users(id) ON DELETE SET NULL,
    reviewed_at TIMESTAMPTZ,
    review_notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_expenses_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_expenses_currency_upper CHECK (currency ~ '^[A-Z]{3}$')
);

CREATE INDEX idx_expenses_user_date ON expenses(user_id, expense_date DESC);
CREATE INDEX idx_expenses_user_category_date ON expenses(user_id, category, expense_date);
CREATE INDEX idx_expenses_team_status ON expenses(team_id, status) WHERE team_id IS NOT NULL;
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    category expense_category NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    limit_amount NUMERIC(19, 4) NOT NULL,
    current_spent NUMERIC(19, 4) NOT NULL DEFAULT 0,
    alert_threshold INTEGER NOT NULL DEFAULT 80,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_budgets_user_category_month UNIQUE (user_id, category, year, month),
    CONSTRAINT chk_budgets_month CHECK (month BETWEEN 1 AND 12),
    CONSTRAINT chk_budgets_year CHECK (year BETWEEN 2000 AND 2100),
    CONSTRAINT chk_budgets_limit_positive CHECK (limit_amount > 0),
    CONSTRAINT chk_budgets_threshold CHECK (alert_threshold BETWEEN 1 AND 100)
);
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    kind notification_kind NOT NULL,
    title VARCHAR(255) NOT NULL,
    message TEXT NOT NULL,
    reference_id UUID,
    is_read BOOLEAN NOT NULL DEFAULT false,
    read_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notifications_user_created ON notifications(user_id, created_at DESC);
CREATE INDEX idx_notifications_user_unread ON notifications(user_id) WHERE is_read = false;
";

const REPORTS_SQL: &str = r"
CREATE TABLE reports (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    filters JSONB NOT NULL DEFAULT '{}',
    statistics JSONB NOT NULL,
    generated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    expires_at TIMESTAMPTZ NOT NULL,

    CONSTRAINT chk_reports_expiry CHECK (expires_at > generated_at)
);

CREATE INDEX idx_reports_user_expires ON reports(user_id, expires_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS reports CASCADE;
DROP TABLE IF EXISTS notifications CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS team_members CASCADE;
DROP TABLE IF EXISTS teams CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP TYPE IF EXISTS notification_kind;
DROP TYPE IF EXISTS expense_category;
DROP TYPE IF EXISTS expense_status;
";
