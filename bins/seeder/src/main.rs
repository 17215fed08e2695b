//! Database seeder for Outlay development and testing.
//!
//! Seeds a manager, two team members, one team, this month's budgets and a
//! handful of expenses so the API has something to show locally.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, bail};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use outlay_core::auth::hash_password;
use outlay_core::expense::ExpenseCategory;
use outlay_db::repositories::{
    BudgetRepository, CreateBudgetInput, CreateExpenseInput, ExpenseRepository, TeamRepository,
    UserRepository,
};
use outlay_shared::config::DatabaseConfig;

/// Password shared by every seeded account.
const DEMO_PASSWORD: &str = "Password123!";

const MANAGER_EMAIL: &str = "manager@outlay.local";
const MEMBERS: [(&str, &str); 2] = [
    ("alice@outlay.local", "Alice Example"),
    ("bob@outlay.local", "Bob Example"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = outlay_db::connect(&DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
    })
    .await
    .context("Failed to connect to database")?;

    let users = UserRepository::new(db.clone());
    if users.email_exists(MANAGER_EMAIL).await? {
        println!("Demo data already present, nothing to do.");
        return Ok(());
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;

    println!("Seeding users...");
    let manager = users
        .create(MANAGER_EMAIL, &password_hash, "Morgan Manager")
        .await?;
    let mut member_ids = Vec::with_capacity(MEMBERS.len());
    for (email, name) in MEMBERS {
        let user = users.create(email, &password_hash, name).await?;
        member_ids.push(user.id);
    }

    println!("Seeding team...");
    let teams = TeamRepository::new(db.clone());
    let team = teams
        .create(manager.id, "Field Sales", Some("Demo team for local development"))
        .await?;
    for (email, _) in MEMBERS {
        teams.add_member(team.id, manager.id, email).await?;
    }

    let today = Utc::now().date_naive();

    println!("Seeding budgets...");
    let budgets = BudgetRepository::new(db.clone());
    for &user_id in &member_ids {
        for (category, limit) in [
            (ExpenseCategory::Travel, dec!(1500.00)),
            (ExpenseCategory::Meals, dec!(300.00)),
        ] {
            budgets
                .create(
                    user_id,
                    CreateBudgetInput {
                        category,
                        year: today.year(),
                        month: today.month(),
                        limit_amount: limit,
                        alert_threshold: None,
                    },
                )
                .await?;
        }
    }

    println!("Seeding expenses...");
    let expenses = ExpenseRepository::new(db);
    let samples = [
        (ExpenseCategory::Travel, dec!(420.00), "Train to client site"),
        (ExpenseCategory::Meals, dec!(64.50), "Team lunch"),
        (ExpenseCategory::Meals, dec!(185.20), "Client dinner"),
        (ExpenseCategory::Software, dec!(49.00), "Design tool licence"),
    ];
    for &user_id in &member_ids {
        for (offset, (category, amount, description)) in samples.iter().enumerate() {
            let expense_date = seed_date(today, offset)?;
            let written = expenses
                .create(
                    user_id,
                    CreateExpenseInput {
                        amount: *amount,
                        currency: None,
                        category: *category,
                        description: (*description).to_string(),
                        expense_date,
                        team_id: Some(team.id),
                        receipt_url: None,
                    },
                    today,
                )
                .await?;
            if offset == 0 {
                approve(&expenses, written.expense.id, manager.id).await?;
            }
        }
    }

    println!("Seeding complete! Log in with any seeded email and password {DEMO_PASSWORD}");
    Ok(())
}

/// Spreads sample expenses over the current month without leaving it.
fn seed_date(today: NaiveDate, offset: usize) -> anyhow::Result<NaiveDate> {
    let back = i64::try_from(offset)?;
    let date = today - Duration::days(back);
    if date.month() == today.month() {
        return Ok(date);
    }
    match today.with_day(1) {
        Some(first) => Ok(first),
        None => bail!("invalid month start for {today}"),
    }
}

async fn approve(
    expenses: &ExpenseRepository,
    expense_id: Uuid,
    manager_id: Uuid,
) -> anyhow::Result<()> {
    expenses
        .approve(expense_id, manager_id, Some("Seeded approval".to_string()))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_date_stays_in_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(seed_date(today, 1).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(seed_date(today, 3).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_seed_date_counts_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(seed_date(today, 0).unwrap(), today);
        assert_eq!(seed_date(today, 2).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());
    }
}
