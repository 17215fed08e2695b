//! Shared setup for repository integration tests.
//!
//! Tests run against the PostgreSQL named by `DATABASE_URL` and are skipped
//! when it is unset.

#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Utc};
use outlay_db::UserRepository;
use outlay_db::entities::users;
use outlay_db::migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn setup() -> Option<DatabaseConnection> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    Some(db)
}

/// Creates a user with a unique email.
pub async fn create_user(db: &DatabaseConnection, name: &str) -> users::Model {
    let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4());
    UserRepository::new(db.clone())
        .create(&email, "$argon2id$test_hash", name)
        .await
        .expect("Failed to create user")
}

/// Today in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The first day of the current month, a date every test may spend on.
pub fn this_month() -> NaiveDate {
    today().with_day(1).expect("day 1 exists")
}

/// Current (year, month).
pub fn year_month() -> (i32, u32) {
    let t = today();
    (t.year(), t.month())
}
