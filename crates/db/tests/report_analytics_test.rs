//! Integration tests for reports and analytics.

mod common;

use chrono::{Datelike, Duration, Utc};
use outlay_core::analytics::Granularity;
use outlay_core::expense::{ExpenseCategory, ExpenseStatus};
use outlay_core::reports::ReportFilters;
use outlay_db::entities::reports;
use outlay_db::repositories::{
    AnalyticsRepository, BudgetRepository, CreateBudgetInput, CreateExpenseInput,
    ExpenseRepository, GenerateReportInput, ReportRepoError, ReportRepository, ReportRetention,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

const RETENTION: ReportRetention = ReportRetention {
    default_ttl_days: 30,
    max_ttl_days: 365,
};

async fn seed(db: &DatabaseConnection, user_id: Uuid, items: &[(Decimal, ExpenseCategory)]) {
    let repo = ExpenseRepository::new(db.clone());
    for (amount, category) in items {
        repo.create(
            user_id,
            CreateExpenseInput {
                amount: *amount,
                currency: None,
                category: *category,
                description: "Seeded".to_string(),
                expense_date: common::this_month(),
                team_id: None,
                receipt_url: None,
            },
            common::today(),
        )
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_report_lifecycle() {
    let Some(db) = common::setup().await else {
        return;
    };
    let user = common::create_user(&db, "Reporter").await;
    let other = common::create_user(&db, "Other").await;
    seed(
        &db,
        user.id,
        &[
            (dec!(10), ExpenseCategory::Meals),
            (dec!(30), ExpenseCategory::Meals),
            (dec!(60), ExpenseCategory::Travel),
        ],
    )
    .await;
    let repo = ReportRepository::new(db.clone());

    let report = repo
        .generate(
            user.id,
            GenerateReportInput {
                name: "Meals".to_string(),
                filters: ReportFilters {
                    category: Some(ExpenseCategory::Meals),
                    ..ReportFilters::default()
                },
                ttl_days: Some(7),
            },
            RETENTION,
        )
        .await
        .unwrap();
    assert_eq!(report.statistics.count, 2);
    assert_eq!(report.statistics.total, dec!(40));
    assert_eq!(report.statistics.average, dec!(20));
    assert_eq!(
        report.statistics.by_status[&ExpenseStatus::Pending].count,
        2
    );
    assert_eq!(report.expires_at - report.generated_at, Duration::days(7));

    let fetched = repo.get(report.id, user.id).await.unwrap();
    assert_eq!(fetched.statistics, report.statistics);
    assert!(matches!(
        repo.get(report.id, other.id).await,
        Err(ReportRepoError::NotFound(_))
    ));

    let ttl_too_long = repo
        .generate(
            user.id,
            GenerateReportInput {
                name: "Forever".to_string(),
                ttl_days: Some(1000),
                ..GenerateReportInput::default()
            },
            RETENTION,
        )
        .await;
    assert!(matches!(ttl_too_long, Err(ReportRepoError::Invalid(_))));

    let model = reports::Entity::find_by_id(report.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: reports::ActiveModel = model.into();
    active.expires_at = Set((Utc::now() - Duration::hours(1)).into());
    active.update(&db).await.unwrap();

    assert!(matches!(
        repo.get(report.id, user.id).await,
        Err(ReportRepoError::NotFound(_))
    ));
    assert!(repo.list(user.id).await.unwrap().is_empty());

    let fresh = repo
        .generate(
            user.id,
            GenerateReportInput {
                name: "Everything".to_string(),
                ..GenerateReportInput::default()
            },
            RETENTION,
        )
        .await
        .unwrap();
    assert_eq!(fresh.statistics.count, 3);
    assert!(reports::Entity::find_by_id(report.id)
        .one(&db)
        .await
        .unwrap()
        .is_none());

    let listed = repo.list(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    repo.delete(fresh.id, user.id).await.unwrap();
    assert!(matches!(
        repo.delete(fresh.id, user.id).await,
        Err(ReportRepoError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_analytics_over_current_month() {
    let Some(db) = common::setup().await else {
        return;
    };
    let user = common::create_user(&db, "Analyst").await;
    seed(
        &db,
        user.id,
        &[
            (dec!(75), ExpenseCategory::Software),
            (dec!(25), ExpenseCategory::Meals),
        ],
    )
    .await;
    let (year, month) = common::year_month();
    BudgetRepository::new(db.clone())
        .create(
            user.id,
            CreateBudgetInput {
                category: ExpenseCategory::Meals,
                year,
                month,
                limit_amount: dec!(20),
                alert_threshold: None,
            },
        )
        .await
        .unwrap();
    let repo = AnalyticsRepository::new(db.clone());
    let today = common::today();

    let by_category = repo
        .by_category(user.id, common::this_month(), today, true)
        .await
        .unwrap();
    assert_eq!(by_category[0].category, ExpenseCategory::Software);
    assert_eq!(by_category[0].percentage, dec!(75));
    assert!(repo
        .by_category(user.id, common::this_month(), today, false)
        .await
        .unwrap()
        .is_empty());

    let trend = repo
        .trend(user.id, common::this_month(), today, Granularity::Day)
        .await
        .unwrap();
    assert_eq!(trend.len(), usize::try_from(today.day()).unwrap());
    assert_eq!(trend[0].total, dec!(100));

    let projection = repo.projection(user.id, None, None, today).await.unwrap();
    assert_eq!(projection.spent, dec!(100));
    assert_eq!(projection.days_elapsed, today.day());
    let meals = projection
        .categories
        .iter()
        .find(|c| c.category == ExpenseCategory::Meals)
        .unwrap();
    assert_eq!(meals.budget_limit, Some(dec!(20)));
    assert!(meals.projected_over_budget);

    let overview = repo.overview(user.id, today).await.unwrap();
    assert_eq!(overview.month_total, dec!(100));
    assert_eq!(overview.pending_count, 2);
    assert_eq!(overview.budgets_over_limit, 1);
    assert_eq!(overview.unread_notifications, 0);
}
