use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::permissions::{Action, Resource},
    domain::{
        lifecycle, CreateNoticeRequest, Identity, Notice, NoticeFilters, NoticeQuery,
        NoticeStatus, Pagination, UpdateNoticeRequest,
    },
    error::{AppError, Result},
    repository::NoticeRepository,
    storage::FileStore,
};

/// A file received from a multipart request, not yet stored.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct PaginationInfo {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

pub struct NoticeListing {
    pub notices: Vec<Notice>,
    pub pagination: PaginationInfo,
}

/// Orchestrates the permission matrix, the lifecycle engine and the
/// visibility builder over the notice repository and the blob store.
pub struct NoticeService {
    repo: Arc<dyn NoticeRepository>,
    files: Arc<dyn FileStore>,
}

impl NoticeService {
    pub fn new(repo: Arc<dyn NoticeRepository>, files: Arc<dyn FileStore>) -> Self {
        Self { repo, files }
    }

    pub async fn list(
        &self,
        caller: Option<&Identity>,
        filters: NoticeFilters,
    ) -> Result<NoticeListing> {
        let query = NoticeQuery::for_caller(caller, filters);
        self.run_listing(query).await
    }

    pub async fn list_mine(
        &self,
        caller: &Identity,
        status: Option<NoticeStatus>,
        pagination: Pagination,
    ) -> Result<NoticeListing> {
        if !caller.can(Resource::Notices, Action::Create) {
            return Err(AppError::Forbidden(
                "You don't have permission to view your notices".to_string(),
            ));
        }
        self.run_listing(NoticeQuery::own(caller, status, pagination)).await
    }

    pub async fn list_pending(
        &self,
        caller: &Identity,
        pagination: Pagination,
    ) -> Result<NoticeListing> {
        if !caller.can(Resource::Notices, Action::Approve) {
            return Err(AppError::Forbidden(
                "You don't have permission to view the approval queue".to_string(),
            ));
        }
        self.run_listing(NoticeQuery::pending_queue(pagination)).await
    }

    /// Single-notice read, applying the same visibility rule as listings.
    /// An existing-but-invisible notice is reported as not found so
    /// non-privileged callers can't probe which ids exist.
    pub async fn get(&self, caller: Option<&Identity>, id: Uuid) -> Result<Notice> {
        let notice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

        let is_privileged = caller
            .map(|c| c.is_admin() || c.owns(notice.created_by))
            .unwrap_or(false);

        let publicly_visible = notice.status == NoticeStatus::Published && notice.is_active;

        if publicly_visible || is_privileged {
            Ok(notice)
        } else {
            Err(AppError::NotFound("Notice not found".to_string()))
        }
    }

    pub async fn create(
        &self,
        caller: &Identity,
        request: CreateNoticeRequest,
        file: Option<UploadedFile>,
    ) -> Result<Notice> {
        if !caller.can(Resource::Notices, Action::Create) {
            return Err(AppError::Forbidden(
                "You don't have permission to create notices".to_string(),
            ));
        }
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let status = lifecycle::initial_status(caller, request.status)?;

        let stored = match file {
            Some(upload) => Some(self.files.upload(&upload.filename, &upload.data).await?),
            None => None,
        };

        let now = Utc::now();
        let mut notice = Notice {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            category: request.category,
            file_url: stored.as_ref().map(|f| f.url.clone()),
            file_storage_id: stored.as_ref().map(|f| f.storage_id.clone()),
            status,
            created_by: caller.user_id,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            date_posted: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        lifecycle::stamp_creation(&mut notice, caller);

        match self.repo.create(notice).await {
            Ok(created) => Ok(created),
            Err(err) => {
                // Compensating cleanup: don't leave an orphaned blob behind
                // a failed insert.
                if let Some(stored) = stored {
                    if let Err(cleanup_err) = self.files.destroy(&stored.storage_id).await {
                        tracing::warn!(
                            "Failed to clean up uploaded file {} after create failure: {}",
                            stored.storage_id,
                            cleanup_err
                        );
                    }
                }
                Err(err)
            }
        }
    }

    pub async fn update(
        &self,
        caller: &Identity,
        id: Uuid,
        request: UpdateNoticeRequest,
        file: Option<UploadedFile>,
    ) -> Result<Notice> {
        let mut notice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

        lifecycle::check_update(&notice, caller)?;

        if let Some(title) = request.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title cannot be empty".to_string()));
            }
            notice.title = title;
        }
        if let Some(description) = request.description {
            if description.trim().is_empty() {
                return Err(AppError::Validation(
                    "Description cannot be empty".to_string(),
                ));
            }
            notice.description = description;
        }
        if let Some(category) = request.category {
            notice.category = category;
        }
        if let Some(target) = request.status {
            lifecycle::change_status(
                &mut notice,
                caller,
                target,
                request.rejection_reason.as_deref(),
            )?;
        }

        if let Some(upload) = file {
            let stored = self.files.upload(&upload.filename, &upload.data).await?;
            if let Some(old_id) = notice.file_storage_id.take() {
                // Best-effort release of the replaced attachment.
                if let Err(err) = self.files.destroy(&old_id).await {
                    tracing::warn!("Failed to delete replaced attachment {}: {}", old_id, err);
                }
            }
            notice.file_url = Some(stored.url);
            notice.file_storage_id = Some(stored.storage_id);
        }

        self.repo.update(id, notice).await
    }

    pub async fn submit(&self, caller: &Identity, id: Uuid) -> Result<Notice> {
        let mut notice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

        lifecycle::submit(&mut notice, caller)?;
        self.repo.update(id, notice).await
    }

    pub async fn approve(&self, caller: &Identity, id: Uuid) -> Result<Notice> {
        let mut notice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

        lifecycle::approve(&mut notice, caller)?;
        self.repo.update(id, notice).await
    }

    pub async fn reject(
        &self,
        caller: &Identity,
        id: Uuid,
        reason: Option<&str>,
    ) -> Result<Notice> {
        let mut notice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

        lifecycle::reject(&mut notice, caller, reason)?;
        self.repo.update(id, notice).await
    }

    /// Hard delete. The attached blob is released before the row goes away;
    /// a storage failure is logged rather than blocking the delete.
    pub async fn delete(&self, caller: &Identity, id: Uuid) -> Result<()> {
        let notice = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

        lifecycle::check_delete(&notice, caller)?;

        if let Some(storage_id) = &notice.file_storage_id {
            if let Err(err) = self.files.destroy(storage_id).await {
                tracing::warn!("Failed to delete attachment {}: {}", storage_id, err);
            }
        }

        self.repo.delete(id).await
    }

    async fn run_listing(&self, query: NoticeQuery) -> Result<NoticeListing> {
        let notices = self.repo.list(&query).await?;
        let total = self.repo.count(&query).await?;

        Ok(NoticeListing {
            notices,
            pagination: PaginationInfo {
                current: query.pagination.page,
                pages: query.pagination.page_count(total),
                total,
            },
        })
    }
}
