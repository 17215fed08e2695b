//! Postgres enum types and their mapping to core enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use outlay_core::expense::{ExpenseCategory as CoreCategory, ExpenseStatus as CoreStatus};
use outlay_core::notification::NotificationKind as CoreKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
pub enum ExpenseStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_category")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "travel")]
    Travel,
    #[sea_orm(string_value = "meals")]
    Meals,
    #[sea_orm(string_value = "transport")]
    Transport,
    #[sea_orm(string_value = "office_supplies")]
    OfficeSupplies,
    #[sea_orm(string_value = "software")]
    Software,
    #[sea_orm(string_value = "equipment")]
    Equipment,
    #[sea_orm(string_value = "utilities")]
    Utilities,
    #[sea_orm(string_value = "entertainment")]
    Entertainment,
    #[sea_orm(string_value = "training")]
    Training,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
pub enum NotificationKind {
    #[sea_orm(string_value = "expense_submitted")]
    ExpenseSubmitted,
    #[sea_orm(string_value = "expense_approved")]
    ExpenseApproved,
    #[sea_orm(string_value = "expense_rejected")]
    ExpenseRejected,
    #[sea_orm(string_value = "budget_warning")]
    BudgetWarning,
    #[sea_orm(string_value = "budget_exceeded")]
    BudgetExceeded,
    #[sea_orm(string_value = "team_added")]
    TeamAdded,
}

impl From<ExpenseStatus> for CoreStatus {
    fn from(status: ExpenseStatus) -> Self {
        match status {
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Approved => Self::Approved,
            ExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<CoreStatus> for ExpenseStatus {
    fn from(status: CoreStatus) -> Self {
        match status {
            CoreStatus::Pending => Self::Pending,
            CoreStatus::Approved => Self::Approved,
            CoreStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ExpenseCategory> for CoreCategory {
    fn from(category: ExpenseCategory) -> Self {
        match category {
            ExpenseCategory::Travel => Self::Travel,
            ExpenseCategory::Meals => Self::Meals,
            ExpenseCategory::Transport => Self::Transport,
            ExpenseCategory::OfficeSupplies => Self::OfficeSupplies,
            ExpenseCategory::Software => Self::Software,
            ExpenseCategory::Equipment => Self::Equipment,
            ExpenseCategory::Utilities => Self::Utilities,
            ExpenseCategory::Entertainment => Self::Entertainment,
            ExpenseCategory::Training => Self::Training,
            ExpenseCategory::Other => Self::Other,
        }
    }
}

impl From<CoreCategory> for ExpenseCategory {
    fn from(category: CoreCategory) -> Self {
        match category {
            CoreCategory::Travel => Self::Travel,
            CoreCategory::Meals => Self::Meals,
            CoreCategory::Transport => Self::Transport,
            CoreCategory::OfficeSupplies => Self::OfficeSupplies,
            CoreCategory::Software => Self::Software,
            CoreCategory::Equipment => Self::Equipment,
            CoreCategory::Utilities => Self::Utilities,
            CoreCategory::Entertainment => Self::Entertainment,
            CoreCategory::Training => Self::Training,
            CoreCategory::Other => Self::Other,
        }
    }
}

impl From<NotificationKind> for CoreKind {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::ExpenseSubmitted => Self::ExpenseSubmitted,
            NotificationKind::ExpenseApproved => Self::ExpenseApproved,
            NotificationKind::ExpenseRejected => Self::ExpenseRejected,
            NotificationKind::BudgetWarning => Self::BudgetWarning,
            NotificationKind::BudgetExceeded => Self::BudgetExceeded,
            NotificationKind::TeamAdded => Self::TeamAdded,
        }
    }
}

impl From<CoreKind> for NotificationKind {
    fn from(kind: CoreKind) -> Self {
        match kind {
            CoreKind::ExpenseSubmitted => Self::ExpenseSubmitted,
            CoreKind::ExpenseApproved => Self::ExpenseApproved,
            CoreKind::ExpenseRejected => Self::ExpenseRejected,
            CoreKind::BudgetWarning => Self::BudgetWarning,
            CoreKind::BudgetExceeded => Self::BudgetExceeded,
            CoreKind::TeamAdded => Self::TeamAdded,
        }
    }
}
