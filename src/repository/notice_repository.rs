use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Notice, NoticeCategory, NoticeQuery, NoticeStatus, VisibilityScope},
    error::{AppError, Result},
    repository::NoticeRepository,
};

const NOTICE_COLUMNS: &str = "id, title, description, category, file_url, file_storage_id, \
     status, created_by, approved_by, approved_at, rejected_by, rejected_at, \
     rejection_reason, date_posted, is_active, created_at, updated_at";

#[derive(FromRow)]
struct NoticeRow {
    id: String,
    title: String,
    description: String,
    category: String,
    file_url: Option<String>,
    file_storage_id: Option<String>,
    status: String,
    created_by: String,
    approved_by: Option<String>,
    approved_at: Option<NaiveDateTime>,
    rejected_by: Option<String>,
    rejected_at: Option<NaiveDateTime>,
    rejection_reason: Option<String>,
    date_posted: NaiveDateTime,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteNoticeRepository {
    pool: SqlitePool,
}

impl SqliteNoticeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notice(row: NoticeRow) -> Result<Notice> {
        Ok(Notice {
            id: parse_uuid(&row.id)?,
            title: row.title,
            description: row.description,
            category: NoticeCategory::parse(&row.category)
                .map_err(|_| AppError::Database(format!("Invalid category: {}", row.category)))?,
            file_url: row.file_url,
            file_storage_id: row.file_storage_id,
            status: NoticeStatus::parse(&row.status)
                .map_err(|_| AppError::Database(format!("Invalid status: {}", row.status)))?,
            created_by: parse_uuid(&row.created_by)?,
            approved_by: row.approved_by.as_deref().map(parse_uuid).transpose()?,
            approved_at: row.approved_at.map(from_naive),
            rejected_by: row.rejected_by.as_deref().map(parse_uuid).transpose()?,
            rejected_at: row.rejected_at.map(from_naive),
            rejection_reason: row.rejection_reason,
            date_posted: from_naive(row.date_posted),
            is_active: row.is_active != 0,
            created_at: from_naive(row.created_at),
            updated_at: from_naive(row.updated_at),
        })
    }

    /// Translates the visibility query into a WHERE clause. Soft-deleted
    /// rows are excluded unconditionally.
    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &NoticeQuery) {
        builder.push(" WHERE is_active = 1");

        match query.scope {
            VisibilityScope::PublishedOnly => {
                builder
                    .push(" AND status = ")
                    .push_bind(NoticeStatus::Published.as_str());
            }
            VisibilityScope::PublishedOrOwn(owner) => {
                builder
                    .push(" AND (status = ")
                    .push_bind(NoticeStatus::Published.as_str())
                    .push(" OR created_by = ")
                    .push_bind(owner.to_string())
                    .push(")");
            }
            VisibilityScope::Own(owner) => {
                builder
                    .push(" AND created_by = ")
                    .push_bind(owner.to_string());
            }
            VisibilityScope::All => {}
        }

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = query.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(dt, Utc)
}

#[async_trait]
impl NoticeRepository for SqliteNoticeRepository {
    async fn create(&self, notice: Notice) -> Result<Notice> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO notices (
                id, title, description, category, file_url, file_storage_id,
                status, created_by, approved_by, approved_at, rejected_by,
                rejected_at, rejection_reason, date_posted, is_active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(notice.id.to_string())
        .bind(&notice.title)
        .bind(&notice.description)
        .bind(notice.category.as_str())
        .bind(&notice.file_url)
        .bind(&notice.file_storage_id)
        .bind(notice.status.as_str())
        .bind(notice.created_by.to_string())
        .bind(notice.approved_by.map(|id| id.to_string()))
        .bind(notice.approved_at.map(|dt| dt.naive_utc()))
        .bind(notice.rejected_by.map(|id| id.to_string()))
        .bind(notice.rejected_at.map(|dt| dt.naive_utc()))
        .bind(&notice.rejection_reason)
        .bind(notice.date_posted.naive_utc())
        .bind(if notice.is_active { 1i32 } else { 0i32 })
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(notice.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created notice".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notice>> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {} FROM notices WHERE id = ?",
            NOTICE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_notice(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &NoticeQuery) -> Result<Vec<Notice>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM notices", NOTICE_COLUMNS));
        Self::push_filters(&mut builder, query);

        // Newest first; id is the stable tie-break.
        builder.push(" ORDER BY date_posted DESC, created_at DESC, id DESC");

        if !query.pagination.is_unlimited() {
            builder
                .push(" LIMIT ")
                .push_bind(query.pagination.limit)
                .push(" OFFSET ")
                .push_bind(query.pagination.offset());
        }

        let rows = builder
            .build_query_as::<NoticeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_notice).collect()
    }

    async fn count(&self, query: &NoticeQuery) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM notices");
        Self::push_filters(&mut builder, query);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn update(&self, id: Uuid, notice: Notice) -> Result<Notice> {
        let now = Utc::now().naive_utc();

        // created_by, created_at and date_posted are immutable after creation.
        sqlx::query(
            r#"
            UPDATE notices
            SET title = ?, description = ?, category = ?, file_url = ?,
                file_storage_id = ?, status = ?, approved_by = ?, approved_at = ?,
                rejected_by = ?, rejected_at = ?, rejection_reason = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&notice.title)
        .bind(&notice.description)
        .bind(notice.category.as_str())
        .bind(&notice.file_url)
        .bind(&notice.file_storage_id)
        .bind(notice.status.as_str())
        .bind(notice.approved_by.map(|id| id.to_string()))
        .bind(notice.approved_at.map(|dt| dt.naive_utc()))
        .bind(notice.rejected_by.map(|id| id.to_string()))
        .bind(notice.rejected_at.map(|dt| dt.naive_utc()))
        .bind(&notice.rejection_reason)
        .bind(if notice.is_active { 1i32 } else { 0i32 })
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated notice".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM notices WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
