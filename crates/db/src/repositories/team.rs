//! Team repository: teams, membership, and manager authority.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use outlay_core::notification::NotificationMessage;
use outlay_shared::AppError;

use super::notification::insert_notification;
use super::user::normalize_email;
use crate::entities::{team_members, teams, users};

/// Error types for team operations.
#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    /// Team not found.
    #[error("Team not found: {0}")]
    NotFound(Uuid),

    /// Caller is not a member of the team.
    #[error("You are not a member of this team")]
    NotMember,

    /// Caller does not manage the team.
    #[error("Only the team manager can do this")]
    NotManager,

    /// No user with this email.
    #[error("No user registered with email {0}")]
    UserNotFound(String),

    /// User already in the team.
    #[error("User is already a member of this team")]
    AlreadyMember,

    /// The manager must stay in the team.
    #[error("The team manager cannot be removed from the team")]
    CannotRemoveManager,

    /// User is not in the team.
    #[error("User {0} is not a member of this team")]
    MemberNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TeamError> for AppError {
    fn from(e: TeamError) -> Self {
        match e {
            TeamError::NotFound(_) | TeamError::UserNotFound(_) | TeamError::MemberNotFound(_) => {
                Self::NotFound(e.to_string())
            }
            TeamError::NotMember | TeamError::NotManager => Self::Forbidden(e.to_string()),
            TeamError::AlreadyMember => Self::Conflict(e.to_string()),
            TeamError::CannotRemoveManager => Self::BusinessRule(e.to_string()),
            TeamError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// A team as seen by one of its members.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    /// Team.
    #[serde(flatten)]
    pub team: teams::Model,
    /// Whether the viewer manages the team.
    pub is_manager: bool,
    /// Number of members, manager included.
    pub member_count: u64,
}

/// One member of a team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberInfo {
    /// User ID.
    pub user_id: Uuid,
    /// Email.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// When the user joined.
    pub joined_at: chrono::DateTime<chrono::FixedOffset>,
    /// Whether this member is the manager.
    pub is_manager: bool,
}

/// A team with its member list.
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetail {
    /// Team.
    #[serde(flatten)]
    pub team: teams::Model,
    /// Members, earliest first.
    pub members: Vec<TeamMemberInfo>,
}

/// Returns true if `user_id` belongs to `team_id`.
pub(crate) async fn is_member<C: ConnectionTrait>(
    conn: &C,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    Ok(team_members::Entity::find_by_id((team_id, user_id))
        .one(conn)
        .await?
        .is_some())
}

/// Manager of a team, if the team exists.
pub(crate) async fn manager_of<C: ConnectionTrait>(
    conn: &C,
    team_id: Uuid,
) -> Result<Option<Uuid>, DbErr> {
    Ok(teams::Entity::find_by_id(team_id)
        .one(conn)
        .await?
        .map(|t| t.manager_id))
}

/// IDs of the teams `user_id` manages.
pub(crate) async fn managed_team_ids<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    teams::Entity::find()
        .filter(teams::Column::ManagerId.eq(user_id))
        .select_only()
        .column(teams::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

/// Team repository.
#[derive(Debug, Clone)]
pub struct TeamRepository {
    db: DatabaseConnection,
}

impl TeamRepository {
    /// Creates a new team repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a team managed by `manager_id`, who also becomes a member.
    pub async fn create(
        &self,
        manager_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<teams::Model, TeamError> {
        let now = Utc::now().into();
        let txn = self.db.begin().await?;

        let team = teams::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            description: Set(description.map(|d| d.trim().to_string())),
            manager_id: Set(manager_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        team_members::ActiveModel {
            team_id: Set(team.id),
            user_id: Set(manager_id),
            joined_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(team_id = %team.id, manager_id = %manager_id, "Team created");
        Ok(team)
    }

    /// Teams the user belongs to.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TeamSummary>, TeamError> {
        let team_ids: Vec<Uuid> = team_members::Entity::find()
            .filter(team_members::Column::UserId.eq(user_id))
            .select_only()
            .column(team_members::Column::TeamId)
            .into_tuple()
            .all(&self.db)
            .await?;

        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let teams = teams::Entity::find()
            .filter(teams::Column::Id.is_in(team_ids.clone()))
            .order_by_asc(teams::Column::Name)
            .all(&self.db)
            .await?;

        let member_rows: Vec<Uuid> = team_members::Entity::find()
            .filter(team_members::Column::TeamId.is_in(team_ids))
            .select_only()
            .column(team_members::Column::TeamId)
            .into_tuple()
            .all(&self.db)
            .await?;
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for team_id in member_rows {
            *counts.entry(team_id).or_default() += 1;
        }

        Ok(teams
            .into_iter()
            .map(|team| TeamSummary {
                is_manager: team.manager_id == user_id,
                member_count: counts.get(&team.id).copied().unwrap_or_default(),
                team,
            })
            .collect())
    }

    /// Gets a team with members. Only members may look.
    pub async fn get_for_member(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<TeamDetail, TeamError> {
        let team = self.find(team_id).await?;
        if !is_member(&self.db, team_id, user_id).await? {
            return Err(TeamError::NotMember);
        }

        let rows = team
            .find_related(team_members::Entity)
            .find_also_related(users::Entity)
            .order_by_asc(team_members::Column::JoinedAt)
            .all(&self.db)
            .await?;

        let members = rows
            .into_iter()
            .filter_map(|(membership, user)| {
                user.map(|u| TeamMemberInfo {
                    is_manager: u.id == team.manager_id,
                    user_id: u.id,
                    email: u.email,
                    full_name: u.full_name,
                    joined_at: membership.joined_at,
                })
            })
            .collect();

        Ok(TeamDetail { team, members })
    }

    /// Loads a team and checks that `user_id` manages it.
    pub async fn require_manager(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<teams::Model, TeamError> {
        let team = self.find(team_id).await?;
        if team.manager_id != user_id {
            return Err(TeamError::NotManager);
        }
        Ok(team)
    }

    /// Renames or re-describes a team. Manager only.
    pub async fn update(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<teams::Model, TeamError> {
        let team = self.require_manager(team_id, user_id).await?;

        let mut active: teams::ActiveModel = team.into();
        if let Some(name) = name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = description {
            let description = description.trim();
            active.description = Set((!description.is_empty()).then(|| description.to_string()));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(team_id = %team_id, "Team updated");
        Ok(updated)
    }

    /// Deletes a team. Its expenses keep existing without a team.
    pub async fn delete(&self, team_id: Uuid, user_id: Uuid) -> Result<(), TeamError> {
        let team = self.require_manager(team_id, user_id).await?;
        team.delete(&self.db).await?;
        info!(team_id = %team_id, "Team deleted");
        Ok(())
    }

    /// Adds a user, found by email, to a team and notifies them. Manager only.
    pub async fn add_member(
        &self,
        team_id: Uuid,
        manager_id: Uuid,
        email: &str,
    ) -> Result<TeamMemberInfo, TeamError> {
        let team = self.require_manager(team_id, manager_id).await?;

        let email = normalize_email(email);
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await?
            .ok_or(TeamError::UserNotFound(email))?;

        if is_member(&self.db, team_id, user.id).await? {
            return Err(TeamError::AlreadyMember);
        }

        let manager_name = users::Entity::find_by_id(manager_id)
            .one(&self.db)
            .await?
            .map_or_else(|| "Your manager".to_string(), |m| m.full_name);

        let txn = self.db.begin().await?;
        let membership = team_members::ActiveModel {
            team_id: Set(team_id),
            user_id: Set(user.id),
            joined_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => TeamError::AlreadyMember,
            _ => TeamError::Database(e),
        })?;

        let message = NotificationMessage::team_added(&team.name, &manager_name);
        insert_notification(&txn, user.id, &message, Some(team_id)).await?;
        txn.commit().await?;

        info!(team_id = %team_id, user_id = %user.id, "Team member added");
        Ok(TeamMemberInfo {
            user_id: user.id,
            email: user.email,
            full_name: user.full_name,
            joined_at: membership.joined_at,
            is_manager: false,
        })
    }

    /// Removes a member. Manager only; the manager cannot be removed.
    pub async fn remove_member(
        &self,
        team_id: Uuid,
        manager_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), TeamError> {
        let team = self.require_manager(team_id, manager_id).await?;
        if user_id == team.manager_id {
            return Err(TeamError::CannotRemoveManager);
        }

        let result = team_members::Entity::delete_by_id((team_id, user_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TeamError::MemberNotFound(user_id));
        }

        info!(team_id = %team_id, user_id = %user_id, "Team member removed");
        Ok(())
    }

    /// Returns true if the user belongs to the team.
    pub async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, TeamError> {
        Ok(is_member(&self.db, team_id, user_id).await?)
    }

    async fn find(&self, team_id: Uuid) -> Result<teams::Model, TeamError> {
        teams::Entity::find_by_id(team_id)
            .one(&self.db)
            .await?
            .ok_or(TeamError::NotFound(team_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(AppError::from(TeamError::NotManager).status_code(), 403);
        assert_eq!(AppError::from(TeamError::AlreadyMember).status_code(), 409);
        assert_eq!(AppError::from(TeamError::CannotRemoveManager).status_code(), 422);
        assert_eq!(
            AppError::from(TeamError::UserNotFound("x@example.com".to_string())).status_code(),
            404
        );
    }
}
