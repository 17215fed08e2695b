//! Review workflow for expenses.
//!
//! Pure transition logic: the repository layer loads the expense and the
//! team's manager, asks this module what the outcome is, then persists it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::ExpenseRuleError;
use super::types::ExpenseStatus;

/// A manager's decision on a pending expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Approve, with optional notes.
    Approve {
        /// Reviewer notes.
        notes: Option<String>,
    },
    /// Reject, with a mandatory reason.
    Reject {
        /// Why the expense was rejected.
        reason: String,
    },
}

impl ReviewDecision {
    /// Status the expense moves to under this decision.
    #[must_use]
    pub const fn target_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve { .. } => ExpenseStatus::Approved,
            Self::Reject { .. } => ExpenseStatus::Rejected,
        }
    }
}

/// The result of a successful review, ready to be persisted.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// New status.
    pub new_status: ExpenseStatus,
    /// Who reviewed the expense.
    pub reviewed_by: Uuid,
    /// When the review happened.
    pub reviewed_at: DateTime<Utc>,
    /// Approval notes or rejection reason.
    pub notes: Option<String>,
}

/// Stateless review rules.
pub struct ExpenseWorkflow;

impl ExpenseWorkflow {
    /// Reviews an expense.
    ///
    /// `team_manager` is the manager of the team the expense is attributed to,
    /// or `None` when the expense has no team. Manager authority itself is
    /// checked by the caller; this enforces the status machine, self-review,
    /// and the rejection-reason requirement.
    pub fn review(
        current: ExpenseStatus,
        submitter: Uuid,
        team_manager: Option<Uuid>,
        reviewer: Uuid,
        decision: ReviewDecision,
    ) -> Result<ReviewOutcome, ExpenseRuleError> {
        if team_manager.is_none() {
            return Err(ExpenseRuleError::NoTeam);
        }
        if submitter == reviewer {
            return Err(ExpenseRuleError::SelfReview);
        }

        let target = decision.target_status();
        if current != ExpenseStatus::Pending {
            return Err(ExpenseRuleError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let notes = match decision {
            ReviewDecision::Approve { notes } => notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            ReviewDecision::Reject { reason } => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(ExpenseRuleError::RejectionReasonRequired);
                }
                Some(reason.to_string())
            }
        };

        Ok(ReviewOutcome {
            new_status: target,
            reviewed_by: reviewer,
            reviewed_at: Utc::now(),
            notes,
        })
    }

    /// Returns true if `viewer` may see an expense owned by `owner`.
    ///
    /// Owners always can; the manager of the expense's team can too.
    #[must_use]
    pub fn can_view(owner: Uuid, team_manager: Option<Uuid>, viewer: Uuid) -> bool {
        owner == viewer || team_manager == Some(viewer)
    }

    /// Checks that the owner may still edit an expense in `status`.
    pub fn ensure_editable(status: ExpenseStatus) -> Result<(), ExpenseRuleError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(ExpenseRuleError::NotEditable(status))
        }
    }

    /// Checks that the owner may delete an expense in `status`.
    pub fn ensure_deletable(status: ExpenseStatus) -> Result<(), ExpenseRuleError> {
        if status.is_deletable() {
            Ok(())
        } else {
            Err(ExpenseRuleError::NotDeletable(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_approve_pending() {
        let (submitter, manager) = ids();
        let outcome = ExpenseWorkflow::review(
            ExpenseStatus::Pending,
            submitter,
            Some(manager),
            manager,
            ReviewDecision::Approve {
                notes: Some("  ok  ".to_string()),
            },
        )
        .unwrap();

        assert_eq!(outcome.new_status, ExpenseStatus::Approved);
        assert_eq!(outcome.reviewed_by, manager);
        assert_eq!(outcome.notes.as_deref(), Some("ok"));
    }

    #[test]
    fn test_blank_approval_notes_dropped() {
        let (submitter, manager) = ids();
        let outcome = ExpenseWorkflow::review(
            ExpenseStatus::Pending,
            submitter,
            Some(manager),
            manager,
            ReviewDecision::Approve {
                notes: Some("   ".to_string()),
            },
        )
        .unwrap();
        assert_eq!(outcome.notes, None);
    }

    #[test]
    fn test_reject_requires_reason() {
        let (submitter, manager) = ids();
        let result = ExpenseWorkflow::review(
            ExpenseStatus::Pending,
            submitter,
            Some(manager),
            manager,
            ReviewDecision::Reject {
                reason: " ".to_string(),
            },
        );
        assert_eq!(result.unwrap_err(), ExpenseRuleError::RejectionReasonRequired);
    }

    #[test]
    fn test_self_review_forbidden() {
        let manager = Uuid::new_v4();
        let result = ExpenseWorkflow::review(
            ExpenseStatus::Pending,
            manager,
            Some(manager),
            manager,
            ReviewDecision::Approve { notes: None },
        );
        assert_eq!(result.unwrap_err(), ExpenseRuleError::SelfReview);
    }

    #[test]
    fn test_expense_without_team_cannot_be_reviewed() {
        let (submitter, reviewer) = ids();
        let result = ExpenseWorkflow::review(
            ExpenseStatus::Pending,
            submitter,
            None,
            reviewer,
            ReviewDecision::Approve { notes: None },
        );
        assert_eq!(result.unwrap_err(), ExpenseRuleError::NoTeam);
    }

    #[test]
    fn test_visibility() {
        let (owner, manager) = ids();
        let stranger = Uuid::new_v4();
        assert!(ExpenseWorkflow::can_view(owner, None, owner));
        assert!(ExpenseWorkflow::can_view(owner, Some(manager), manager));
        assert!(!ExpenseWorkflow::can_view(owner, Some(manager), stranger));
        assert!(!ExpenseWorkflow::can_view(owner, None, manager));
    }

    #[test]
    fn test_edit_and_delete_guards() {
        assert!(ExpenseWorkflow::ensure_editable(ExpenseStatus::Pending).is_ok());
        assert_eq!(
            ExpenseWorkflow::ensure_editable(ExpenseStatus::Approved),
            Err(ExpenseRuleError::NotEditable(ExpenseStatus::Approved))
        );
        assert!(ExpenseWorkflow::ensure_deletable(ExpenseStatus::Rejected).is_ok());
        assert_eq!(
            ExpenseWorkflow::ensure_deletable(ExpenseStatus::Approved),
            Err(ExpenseRuleError::NotDeletable(ExpenseStatus::Approved))
        );
    }

    fn status_strategy() -> impl Strategy<Value = ExpenseStatus> {
        prop_oneof![
            Just(ExpenseStatus::Pending),
            Just(ExpenseStatus::Approved),
            Just(ExpenseStatus::Rejected),
        ]
    }

    proptest! {
        /// Only pending expenses can be reviewed, whatever the decision.
        #[test]
        fn prop_only_pending_is_reviewable(status in status_strategy(), approve in any::<bool>()) {
            let (submitter, manager) = ids();
            let decision = if approve {
                ReviewDecision::Approve { notes: None }
            } else {
                ReviewDecision::Reject { reason: "duplicate".to_string() }
            };
            let target = decision.target_status();

            let result = ExpenseWorkflow::review(status, submitter, Some(manager), manager, decision);

            if status == ExpenseStatus::Pending {
                prop_assert_eq!(result.unwrap().new_status, target);
            } else {
                prop_assert_eq!(
                    result.unwrap_err(),
                    ExpenseRuleError::InvalidTransition { from: status, to: target }
                );
            }
        }
    }
}
