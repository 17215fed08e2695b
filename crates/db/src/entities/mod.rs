//! `SeaORM` entity definitions.

#![allow(missing_docs)]

pub mod budgets;
pub mod expenses;
pub mod notifications;
pub mod reports;
pub mod sea_orm_active_enums;
pub mod team_members;
pub mod teams;
pub mod users;
