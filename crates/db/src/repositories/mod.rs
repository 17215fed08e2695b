//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Budget reconciliation and notification inserts are crate-private helpers
//! that run on whichever transaction the calling repository opened.

pub mod analytics;
pub mod budget;
pub mod expense;
pub mod notification;
pub mod report;
pub mod team;
pub mod user;

pub use analytics::{AnalyticsRepoError, AnalyticsRepository};
pub use budget::{
    BudgetError, BudgetRepository, BudgetWithStatus, CreateBudgetInput, RaisedAlert,
    UpdateBudgetInput,
};
pub use expense::{
    CreateExpenseInput, ExpenseError, ExpenseFilter, ExpenseRepository, ExpenseWrite,
    UpdateExpenseInput,
};
pub use notification::{NotificationError, NotificationRepository};
pub use report::{
    GenerateReportInput, ReportRepoError, ReportRepository, ReportRetention, StoredReport,
};
pub use team::{TeamDetail, TeamError, TeamMemberInfo, TeamRepository, TeamSummary};
pub use user::{UserError, UserRepository};
