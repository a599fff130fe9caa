//! Per-caller visibility rules for notice listings.
//!
//! Listing endpoints never hand a raw filter to the repository. The caller's
//! identity is folded into a [`NoticeQuery`] here, and the repository only
//! translates that query into SQL. This keeps the role rules in one place:
//! anonymous and student callers see published notices only (their status
//! filter is ignored, not an error), staff see published notices plus their
//! own in any status, and admins see everything.

use uuid::Uuid;

use crate::auth::permissions::{Action, Resource};
use crate::domain::{Identity, NoticeCategory, NoticeStatus};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;

/// Base predicate selecting which rows a caller may see at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Published notices only (anonymous callers and students).
    PublishedOnly,
    /// Published notices plus everything the caller created (staff).
    PublishedOrOwn(Uuid),
    /// Only the caller's own notices (the "my notices" dashboard).
    Own(Uuid),
    /// No row-level restriction (admins).
    All,
}

/// Caller-supplied filters, before any role rules are applied.
#[derive(Debug, Clone, Default)]
pub struct NoticeFilters {
    pub category: Option<NoticeCategory>,
    pub search: Option<String>,
    pub status: Option<NoticeStatus>,
    pub pagination: Pagination,
}

/// The effective query handed to the repository.
#[derive(Debug, Clone)]
pub struct NoticeQuery {
    pub scope: VisibilityScope,
    pub status: Option<NoticeStatus>,
    pub category: Option<NoticeCategory>,
    pub search: Option<String>,
    pub pagination: Pagination,
}

impl NoticeQuery {
    pub fn for_caller(caller: Option<&Identity>, filters: NoticeFilters) -> Self {
        let (scope, status) = match caller {
            Some(identity) if identity.can(Resource::Notices, Action::ReadAll) => {
                (VisibilityScope::All, filters.status)
            }
            Some(identity) if identity.can(Resource::Notices, Action::Create) => {
                // Staff: the status filter narrows within published-or-own,
                // it cannot widen into other users' unpublished notices.
                (VisibilityScope::PublishedOrOwn(identity.user_id), filters.status)
            }
            // Students and anonymous callers: published only, the requested
            // status filter is overridden.
            _ => (VisibilityScope::PublishedOnly, None),
        };

        Self {
            scope,
            status,
            category: filters.category,
            search: filters.search,
            pagination: filters.pagination,
        }
    }

    /// The creator's own dashboard: bypasses role-based visibility entirely.
    pub fn own(actor: &Identity, status: Option<NoticeStatus>, pagination: Pagination) -> Self {
        Self {
            scope: VisibilityScope::Own(actor.user_id),
            status,
            category: None,
            search: None,
            pagination,
        }
    }

    /// The admin review queue: every pending notice, regardless of creator.
    pub fn pending_queue(pagination: Pagination) -> Self {
        Self {
            scope: VisibilityScope::All,
            status: Some(NoticeStatus::PendingApproval),
            category: None,
            search: None,
            pagination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Parses raw query-string values. Non-numeric or out-of-range input
    /// falls back to the defaults; a limit of 0 means "return everything".
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| *l >= 0)
            .unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }

    /// Everything-in-one-page sentinel.
    pub fn all() -> Self {
        Self { page: 1, limit: 0 }
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == 0
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn page_count(&self, total: i64) -> i64 {
        if self.is_unlimited() {
            1
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}
