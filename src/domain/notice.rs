use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: NoticeCategory,
    pub file_url: Option<String>,
    pub file_storage_id: Option<String>,
    pub status: NoticeStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub date_posted: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notice {
    pub fn clear_approval(&mut self) {
        self.approved_by = None;
        self.approved_at = None;
    }

    pub fn clear_rejection(&mut self) {
        self.rejected_by = None;
        self.rejected_at = None;
        self.rejection_reason = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeStatus {
    Draft,
    PendingApproval,
    Published,
    Rejected,
}

impl NoticeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeStatus::Draft => "draft",
            NoticeStatus::PendingApproval => "pending_approval",
            NoticeStatus::Published => "published",
            NoticeStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<NoticeStatus> {
        match s {
            "draft" => Ok(NoticeStatus::Draft),
            "pending_approval" => Ok(NoticeStatus::PendingApproval),
            "published" => Ok(NoticeStatus::Published),
            "rejected" => Ok(NoticeStatus::Rejected),
            _ => Err(AppError::Validation(format!("Invalid status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeCategory {
    Academic,
    Exam,
    Events,
    Clubs,
    General,
    Sports,
    Library,
    Placement,
}

impl NoticeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeCategory::Academic => "Academic",
            NoticeCategory::Exam => "Exam",
            NoticeCategory::Events => "Events",
            NoticeCategory::Clubs => "Clubs",
            NoticeCategory::General => "General",
            NoticeCategory::Sports => "Sports",
            NoticeCategory::Library => "Library",
            NoticeCategory::Placement => "Placement",
        }
    }

    pub fn parse(s: &str) -> Result<NoticeCategory> {
        match s {
            "Academic" => Ok(NoticeCategory::Academic),
            "Exam" => Ok(NoticeCategory::Exam),
            "Events" => Ok(NoticeCategory::Events),
            "Clubs" => Ok(NoticeCategory::Clubs),
            "General" => Ok(NoticeCategory::General),
            "Sports" => Ok(NoticeCategory::Sports),
            "Library" => Ok(NoticeCategory::Library),
            "Placement" => Ok(NoticeCategory::Placement),
            _ => Err(AppError::Validation(format!("Invalid category: {}", s))),
        }
    }
}

impl Default for NoticeCategory {
    fn default() -> Self {
        NoticeCategory::General
    }
}

#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateNoticeRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category: NoticeCategory,
    pub status: Option<NoticeStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoticeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<NoticeCategory>,
    pub status: Option<NoticeStatus>,
    pub rejection_reason: Option<String>,
}
