//! Core business logic for Outlay.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `auth` - Password policy and Argon2id hashing
//! - `expense` - Expense fields, statuses, and the review workflow
//! - `budget` - Budget reconciliation, status, and alerts
//! - `analytics` - Spending breakdowns, trends, and projections
//! - `reports` - Report statistics and expiry
//! - `notification` - Notification kinds and message text

pub mod analytics;
pub mod auth;
pub mod budget;
pub mod expense;
pub mod notification;
pub mod reports;
