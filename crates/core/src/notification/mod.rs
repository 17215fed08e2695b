//! Notification kinds and message text.

pub mod message;

pub use message::{NotificationKind, NotificationMessage};
