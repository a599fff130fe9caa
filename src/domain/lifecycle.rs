//! Notice lifecycle state machine.
//!
//! Every status change flows through this module. Each transition states who
//! may invoke it, which current status it requires, and which audit fields it
//! stamps or clears. The approval triple (approved_by/approved_at) and the
//! rejection triple (rejected_by/rejected_at/rejection_reason) are mutually
//! exclusive: a transition that stamps one side always clears the other, and
//! moving away from a stamped outcome clears its stale stamps.

use chrono::Utc;

use crate::auth::permissions::{Action, Resource};
use crate::domain::{Identity, Notice, NoticeStatus, Role};
use crate::error::{AppError, Result};

pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Resolves the status a freshly created notice starts in.
///
/// Staff default to `Draft` and may explicitly request `PendingApproval`
/// (create-and-submit in one step); any other requested status is a
/// permission error. Admins may create in any status, still defaulting to
/// `Draft` rather than auto-publishing.
pub fn initial_status(actor: &Identity, requested: Option<NoticeStatus>) -> Result<NoticeStatus> {
    let status = requested.unwrap_or(NoticeStatus::Draft);

    if actor.is_admin() {
        return Ok(status);
    }

    if actor.has_role(Role::Staff) {
        return match status {
            NoticeStatus::Draft | NoticeStatus::PendingApproval => Ok(status),
            _ => Err(AppError::Forbidden(
                "Staff may only create draft or pending approval notices".to_string(),
            )),
        };
    }

    Err(AppError::Forbidden(
        "You don't have permission to create notices".to_string(),
    ))
}

/// Applies creation-time audit stamps. A notice created directly in
/// `Published` (admin-only path) carries its creator as approver.
pub fn stamp_creation(notice: &mut Notice, actor: &Identity) {
    if notice.status == NoticeStatus::Published {
        notice.approved_by = Some(actor.user_id);
        notice.approved_at = Some(Utc::now());
    }
}

/// `draft → pending_approval`, invoked by the notice's creator.
///
/// Ownership is checked before status so a non-owner always gets a
/// permission error, never a hint about the notice's current state.
pub fn submit(notice: &mut Notice, actor: &Identity) -> Result<()> {
    if !actor.owns(notice.created_by) {
        return Err(AppError::Forbidden(
            "Only the creator can submit a notice for approval".to_string(),
        ));
    }
    if notice.status != NoticeStatus::Draft {
        return Err(AppError::Validation(
            "Only draft notices can be submitted for approval".to_string(),
        ));
    }

    notice.status = NoticeStatus::PendingApproval;
    notice.clear_approval();
    notice.clear_rejection();
    Ok(())
}

/// `pending_approval → published`, admin only. Stamps the approval triple
/// and clears any rejection left over from an earlier round.
pub fn approve(notice: &mut Notice, actor: &Identity) -> Result<()> {
    if !actor.can(Resource::Notices, Action::Approve) {
        return Err(AppError::Forbidden(
            "You don't have permission to approve notices".to_string(),
        ));
    }
    if notice.status != NoticeStatus::PendingApproval {
        return Err(AppError::Validation(
            "Only pending notices can be approved".to_string(),
        ));
    }

    notice.status = NoticeStatus::Published;
    notice.approved_by = Some(actor.user_id);
    notice.approved_at = Some(Utc::now());
    notice.clear_rejection();
    Ok(())
}

/// `pending_approval → rejected`, admin only. An empty or missing reason is
/// recorded as "No reason provided" rather than left null.
pub fn reject(notice: &mut Notice, actor: &Identity, reason: Option<&str>) -> Result<()> {
    if !actor.can(Resource::Notices, Action::Reject) {
        return Err(AppError::Forbidden(
            "You don't have permission to reject notices".to_string(),
        ));
    }
    if notice.status != NoticeStatus::PendingApproval {
        return Err(AppError::Validation(
            "Only pending notices can be rejected".to_string(),
        ));
    }

    let reason = reason.map(str::trim).filter(|r| !r.is_empty());

    notice.status = NoticeStatus::Rejected;
    notice.rejected_by = Some(actor.user_id);
    notice.rejected_at = Some(Utc::now());
    notice.rejection_reason = Some(reason.unwrap_or(DEFAULT_REJECTION_REASON).to_string());
    notice.clear_approval();
    Ok(())
}

/// Status change through the edit path.
///
/// Admins may move a notice between any two statuses. The audit-field rule
/// is explicit per target: moving to `Published` stamps the approval triple,
/// moving to `Rejected` stamps the rejection triple (with the given reason),
/// and moving to `Draft`/`PendingApproval` clears both. Setting the status a
/// notice already has leaves its stamps untouched.
///
/// Staff may only move their own notices, and only between `Draft` and
/// `PendingApproval`; staff-driven changes always clear both triples.
pub fn change_status(
    notice: &mut Notice,
    actor: &Identity,
    target: NoticeStatus,
    reason: Option<&str>,
) -> Result<()> {
    if actor.is_admin() {
        if target == notice.status {
            return Ok(());
        }
        notice.status = target;
        match target {
            NoticeStatus::Published => {
                notice.approved_by = Some(actor.user_id);
                notice.approved_at = Some(Utc::now());
                notice.clear_rejection();
            }
            NoticeStatus::Rejected => {
                let reason = reason.map(str::trim).filter(|r| !r.is_empty());
                notice.rejected_by = Some(actor.user_id);
                notice.rejected_at = Some(Utc::now());
                notice.rejection_reason =
                    Some(reason.unwrap_or(DEFAULT_REJECTION_REASON).to_string());
                notice.clear_approval();
            }
            NoticeStatus::Draft | NoticeStatus::PendingApproval => {
                notice.clear_approval();
                notice.clear_rejection();
            }
        }
        return Ok(());
    }

    if actor.has_role(Role::Staff) {
        if !actor.owns(notice.created_by) {
            return Err(AppError::Forbidden(
                "You can only modify your own notices".to_string(),
            ));
        }
        return match target {
            NoticeStatus::Draft | NoticeStatus::PendingApproval => {
                notice.status = target;
                notice.clear_approval();
                notice.clear_rejection();
                Ok(())
            }
            _ => Err(AppError::Forbidden(
                "Staff may only move notices to draft or pending approval".to_string(),
            )),
        };
    }

    Err(AppError::Forbidden(
        "You don't have permission to change notice status".to_string(),
    ))
}

/// Ownership gate for content edits (title, description, category, file).
pub fn check_update(notice: &Notice, actor: &Identity) -> Result<()> {
    if actor.is_admin() {
        return Ok(());
    }
    if actor.has_role(Role::Staff) && actor.owns(notice.created_by) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "You can only modify your own notices".to_string(),
    ))
}

/// Deletion gate. Admins may delete any notice; staff may delete their own
/// while it is still a draft or pending approval. Once published or
/// rejected, only an admin can remove it.
pub fn check_delete(notice: &Notice, actor: &Identity) -> Result<()> {
    if actor.is_admin() {
        return Ok(());
    }
    if actor.has_role(Role::Staff) {
        if !actor.owns(notice.created_by) {
            return Err(AppError::Forbidden(
                "You can only delete your own notices".to_string(),
            ));
        }
        return match notice.status {
            NoticeStatus::Draft | NoticeStatus::PendingApproval => Ok(()),
            _ => Err(AppError::Forbidden(
                "Staff may only delete draft or pending approval notices".to_string(),
            )),
        };
    }
    Err(AppError::Forbidden(
        "You don't have permission to delete notices".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoticeCategory;
    use uuid::Uuid;

    fn admin() -> Identity {
        Identity::new(Uuid::new_v4(), vec![Role::Admin])
    }

    fn staff() -> Identity {
        Identity::new(Uuid::new_v4(), vec![Role::Staff])
    }

    fn notice(status: NoticeStatus, created_by: Uuid) -> Notice {
        let now = Utc::now();
        Notice {
            id: Uuid::new_v4(),
            title: "Exam schedule".to_string(),
            description: "Spring exam timetable".to_string(),
            category: NoticeCategory::Exam,
            file_url: None,
            file_storage_id: None,
            status,
            created_by,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            date_posted: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn staff_create_defaults_to_draft() {
        let actor = staff();
        assert_eq!(initial_status(&actor, None).unwrap(), NoticeStatus::Draft);
        assert_eq!(
            initial_status(&actor, Some(NoticeStatus::PendingApproval)).unwrap(),
            NoticeStatus::PendingApproval
        );
    }

    #[test]
    fn staff_cannot_create_published() {
        let actor = staff();
        assert!(matches!(
            initial_status(&actor, Some(NoticeStatus::Published)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            initial_status(&actor, Some(NoticeStatus::Rejected)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_create_defaults_to_draft_not_published() {
        let actor = admin();
        assert_eq!(initial_status(&actor, None).unwrap(), NoticeStatus::Draft);
        assert_eq!(
            initial_status(&actor, Some(NoticeStatus::Published)).unwrap(),
            NoticeStatus::Published
        );
    }

    #[test]
    fn direct_publish_stamps_creator_as_approver() {
        let actor = admin();
        let mut n = notice(NoticeStatus::Published, actor.user_id);
        stamp_creation(&mut n, &actor);
        assert_eq!(n.approved_by, Some(actor.user_id));
        assert!(n.approved_at.is_some());
    }

    #[test]
    fn submit_requires_ownership_then_draft_status() {
        let owner = staff();
        let other = staff();

        let mut n = notice(NoticeStatus::Draft, owner.user_id);
        assert!(matches!(
            submit(&mut n, &other),
            Err(AppError::Forbidden(_))
        ));

        let mut rejected = notice(NoticeStatus::Rejected, owner.user_id);
        assert!(matches!(
            submit(&mut rejected, &owner),
            Err(AppError::Validation(_))
        ));

        submit(&mut n, &owner).unwrap();
        assert_eq!(n.status, NoticeStatus::PendingApproval);
    }

    #[test]
    fn submit_clears_prior_rejection() {
        let owner = staff();
        let reviewer = admin();
        let mut n = notice(NoticeStatus::Draft, owner.user_id);
        n.rejected_by = Some(reviewer.user_id);
        n.rejected_at = Some(Utc::now());
        n.rejection_reason = Some("incomplete".to_string());

        submit(&mut n, &owner).unwrap();
        assert!(n.rejected_by.is_none());
        assert!(n.rejection_reason.is_none());
    }

    #[test]
    fn approve_only_from_pending() {
        let reviewer = admin();
        let mut n = notice(NoticeStatus::PendingApproval, Uuid::new_v4());
        approve(&mut n, &reviewer).unwrap();
        assert_eq!(n.status, NoticeStatus::Published);
        assert_eq!(n.approved_by, Some(reviewer.user_id));

        // A second approve is an error, not a silent no-op.
        assert!(matches!(
            approve(&mut n, &reviewer),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn staff_cannot_approve() {
        let actor = staff();
        let mut n = notice(NoticeStatus::PendingApproval, actor.user_id);
        assert!(matches!(
            approve(&mut n, &actor),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn reject_stamps_reason_and_clears_approval() {
        let reviewer = admin();
        let mut n = notice(NoticeStatus::PendingApproval, Uuid::new_v4());
        n.approved_by = Some(reviewer.user_id);
        n.approved_at = Some(Utc::now());

        reject(&mut n, &reviewer, Some("incomplete")).unwrap();
        assert_eq!(n.status, NoticeStatus::Rejected);
        assert_eq!(n.rejection_reason.as_deref(), Some("incomplete"));
        assert!(n.approved_by.is_none());
        assert!(n.approved_at.is_none());
    }

    #[test]
    fn reject_defaults_empty_reason() {
        let reviewer = admin();
        let mut n = notice(NoticeStatus::PendingApproval, Uuid::new_v4());
        reject(&mut n, &reviewer, Some("   ")).unwrap();
        assert_eq!(n.rejection_reason.as_deref(), Some(DEFAULT_REJECTION_REASON));
    }

    #[test]
    fn reject_only_from_pending() {
        let reviewer = admin();
        let mut n = notice(NoticeStatus::Published, Uuid::new_v4());
        assert!(matches!(
            reject(&mut n, &reviewer, None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn admin_unpublish_clears_stale_approval() {
        let reviewer = admin();
        let mut n = notice(NoticeStatus::Published, Uuid::new_v4());
        n.approved_by = Some(reviewer.user_id);
        n.approved_at = Some(Utc::now());

        change_status(&mut n, &reviewer, NoticeStatus::Draft, None).unwrap();
        assert_eq!(n.status, NoticeStatus::Draft);
        assert!(n.approved_by.is_none());
        assert!(n.approved_at.is_none());
    }

    #[test]
    fn admin_edit_to_published_stamps_approval() {
        let reviewer = admin();
        let mut n = notice(NoticeStatus::Draft, Uuid::new_v4());
        change_status(&mut n, &reviewer, NoticeStatus::Published, None).unwrap();
        assert_eq!(n.approved_by, Some(reviewer.user_id));
    }

    #[test]
    fn admin_same_status_edit_keeps_stamps() {
        let reviewer = admin();
        let approver = Uuid::new_v4();
        let mut n = notice(NoticeStatus::Published, Uuid::new_v4());
        n.approved_by = Some(approver);
        n.approved_at = Some(Utc::now());

        change_status(&mut n, &reviewer, NoticeStatus::Published, None).unwrap();
        assert_eq!(n.approved_by, Some(approver));
    }

    #[test]
    fn staff_status_change_limited_to_draft_and_pending() {
        let owner = staff();
        let mut n = notice(NoticeStatus::Draft, owner.user_id);
        assert!(matches!(
            change_status(&mut n, &owner, NoticeStatus::Published, None),
            Err(AppError::Forbidden(_))
        ));
        change_status(&mut n, &owner, NoticeStatus::PendingApproval, None).unwrap();
        assert_eq!(n.status, NoticeStatus::PendingApproval);
    }

    #[test]
    fn staff_delete_restricted_by_status() {
        let owner = staff();
        assert!(check_delete(&notice(NoticeStatus::Draft, owner.user_id), &owner).is_ok());
        assert!(check_delete(&notice(NoticeStatus::PendingApproval, owner.user_id), &owner).is_ok());
        assert!(matches!(
            check_delete(&notice(NoticeStatus::Published, owner.user_id), &owner),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_delete(&notice(NoticeStatus::Draft, Uuid::new_v4()), &owner),
            Err(AppError::Forbidden(_))
        ));
        assert!(check_delete(&notice(NoticeStatus::Published, owner.user_id), &admin()).is_ok());
    }
}
