//! Static permission matrix: role → resource → action.
//!
//! This layer is deliberately coarse-grained. It answers "may this role ever
//! perform this action on this kind of resource" and nothing more. Per-record
//! rules (ownership, status restrictions) live in the lifecycle engine and
//! the notice service, which consult the record itself. Keeping the two
//! layers separate means the matrix can stay a pure, process-wide constant
//! with no mutation API.

use crate::domain::{Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Notices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    ReadAll,
    Update,
    Delete,
    Approve,
    Reject,
    Publish,
}

/// Role-level permission check. Total over the closed role/resource/action
/// enums; the row for each role mirrors the notice board's access table:
/// admins hold every action, staff hold create/read/update/delete (scoped to
/// their own records elsewhere), students hold read only.
pub fn has_permission(role: Role, resource: Resource, action: Action) -> bool {
    match resource {
        Resource::Notices => match role {
            Role::Admin => true,
            Role::Staff => matches!(
                action,
                Action::Create | Action::Read | Action::Update | Action::Delete
            ),
            Role::Student => matches!(action, Action::Read),
        },
    }
}

impl Identity {
    /// Effective permission: the OR across every role the caller holds.
    pub fn can(&self, resource: Resource, action: Action) -> bool {
        self.roles
            .iter()
            .any(|role| has_permission(*role, resource, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn admin_holds_every_notice_action() {
        for action in [
            Action::Create,
            Action::Read,
            Action::ReadAll,
            Action::Update,
            Action::Delete,
            Action::Approve,
            Action::Reject,
            Action::Publish,
        ] {
            assert!(has_permission(Role::Admin, Resource::Notices, action));
        }
    }

    #[test]
    fn staff_cannot_moderate_or_read_all() {
        assert!(has_permission(Role::Staff, Resource::Notices, Action::Create));
        assert!(has_permission(Role::Staff, Resource::Notices, Action::Read));
        assert!(has_permission(Role::Staff, Resource::Notices, Action::Update));
        assert!(has_permission(Role::Staff, Resource::Notices, Action::Delete));
        assert!(!has_permission(Role::Staff, Resource::Notices, Action::ReadAll));
        assert!(!has_permission(Role::Staff, Resource::Notices, Action::Approve));
        assert!(!has_permission(Role::Staff, Resource::Notices, Action::Reject));
        assert!(!has_permission(Role::Staff, Resource::Notices, Action::Publish));
    }

    #[test]
    fn student_is_read_only() {
        assert!(has_permission(Role::Student, Resource::Notices, Action::Read));
        for action in [
            Action::Create,
            Action::ReadAll,
            Action::Update,
            Action::Delete,
            Action::Approve,
            Action::Reject,
            Action::Publish,
        ] {
            assert!(!has_permission(Role::Student, Resource::Notices, action));
        }
    }

    #[test]
    fn effective_permission_is_union_of_roles() {
        let staff_student = Identity::new(Uuid::new_v4(), vec![Role::Student, Role::Staff]);
        assert!(staff_student.can(Resource::Notices, Action::Create));
        assert!(!staff_student.can(Resource::Notices, Action::Approve));

        let student = Identity::new(Uuid::new_v4(), vec![Role::Student]);
        assert!(!student.can(Resource::Notices, Action::Create));
    }
}
