//! Notification repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use tracing::debug;
use uuid::Uuid;

use outlay_core::notification::NotificationMessage;
use outlay_shared::{AppError, types::PageRequest};

use crate::entities::notifications;

/// Error types for notification operations.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Notification not found (or not the caller's).
    #[error("Notification not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound(_) => Self::NotFound(e.to_string()),
            NotificationError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Stores a notification on any connection, so callers can do it inside
/// their own transaction.
pub(crate) async fn insert_notification<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    message: &NotificationMessage,
    reference_id: Option<Uuid>,
) -> Result<notifications::Model, DbErr> {
    let notification = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        kind: Set(message.kind.into()),
        title: Set(message.title.clone()),
        message: Set(message.message.clone()),
        reference_id: Set(reference_id),
        is_read: Set(false),
        read_at: Set(None),
        created_at: Set(Utc::now().into()),
    };

    let model = notification.insert(conn).await?;
    debug!(user_id = %user_id, kind = %message.kind, "Notification stored");
    Ok(model)
}

/// Notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's notifications, newest first. Returns the page and the total.
    pub async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> Result<(Vec<notifications::Model>, u64), NotificationError> {
        let mut query =
            notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(notifications::Column::IsRead.eq(false));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        Ok(notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(&self.db)
            .await?)
    }

    /// Marks one notification read. Already-read notifications keep their `read_at`.
    pub async fn mark_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<notifications::Model, NotificationError> {
        let notification = self.find_owned(id, user_id).await?;
        if notification.is_read {
            return Ok(notification);
        }

        let mut active: notifications::ActiveModel = notification.into();
        active.is_read = Set(true);
        active.read_at = Set(Some(Utc::now().into()));

        Ok(active.update(&self.db).await?)
    }

    /// Marks every unread notification read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .col_expr(notifications::Column::ReadAt, Expr::value(now))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Deletes a notification.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), NotificationError> {
        let result = notifications::Entity::delete_many()
            .filter(notifications::Column::Id.eq(id))
            .filter(notifications::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(NotificationError::NotFound(id));
        }
        Ok(())
    }

    async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<notifications::Model, NotificationError> {
        notifications::Entity::find_by_id(id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(NotificationError::NotFound(id))
    }
}
