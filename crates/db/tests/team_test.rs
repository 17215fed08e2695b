//! Integration tests for the team repository.

mod common;

use outlay_db::entities::sea_orm_active_enums::NotificationKind;
use outlay_db::repositories::{NotificationRepository, TeamError, TeamRepository};
use outlay_shared::types::PageRequest;
use uuid::Uuid;

#[tokio::test]
async fn test_team_lifecycle() {
    let Some(db) = common::setup().await else {
        return;
    };
    let manager = common::create_user(&db, "Lead").await;
    let member = common::create_user(&db, "Member").await;
    let repo = TeamRepository::new(db.clone());

    let team = repo
        .create(manager.id, "Platform", Some("Infra spend"))
        .await
        .unwrap();
    assert_eq!(team.manager_id, manager.id);
    assert!(repo.is_member(team.id, manager.id).await.unwrap());

    let added = repo
        .add_member(team.id, manager.id, &member.email.to_uppercase())
        .await
        .unwrap();
    assert_eq!(added.user_id, member.id);
    assert!(matches!(
        repo.add_member(team.id, manager.id, &member.email).await,
        Err(TeamError::AlreadyMember)
    ));

    let (notes, _) = NotificationRepository::new(db.clone())
        .list(member.id, true, &PageRequest::default())
        .await
        .unwrap();
    assert!(notes.iter().any(|n| n.kind == NotificationKind::TeamAdded));

    let detail = repo.get_for_member(team.id, member.id).await.unwrap();
    assert_eq!(detail.members.len(), 2);

    let mine = repo.list_for_user(member.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(!mine[0].is_manager);
    assert_eq!(mine[0].member_count, 2);

    assert!(matches!(
        repo.update(team.id, member.id, Some("Hijack"), None).await,
        Err(TeamError::NotManager)
    ));
    let renamed = repo
        .update(team.id, manager.id, Some("Platform Eng"), None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Platform Eng");

    assert!(matches!(
        repo.remove_member(team.id, manager.id, manager.id).await,
        Err(TeamError::CannotRemoveManager)
    ));
    repo.remove_member(team.id, manager.id, member.id)
        .await
        .unwrap();
    assert!(matches!(
        repo.remove_member(team.id, manager.id, member.id).await,
        Err(TeamError::MemberNotFound(_))
    ));
    assert!(matches!(
        repo.get_for_member(team.id, member.id).await,
        Err(TeamError::NotMember)
    ));

    repo.delete(team.id, manager.id).await.unwrap();
    assert!(matches!(
        repo.get_for_member(team.id, manager.id).await,
        Err(TeamError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_add_unknown_user() {
    let Some(db) = common::setup().await else {
        return;
    };
    let manager = common::create_user(&db, "Lead").await;
    let repo = TeamRepository::new(db.clone());
    let team = repo.create(manager.id, "Solo", None).await.unwrap();

    let result = repo
        .add_member(team.id, manager.id, &format!("ghost-{}@example.com", Uuid::new_v4()))
        .await;
    assert!(matches!(result, Err(TeamError::UserNotFound(_))));
}
