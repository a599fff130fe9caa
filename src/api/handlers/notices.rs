use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        CreateNoticeRequest, Notice, NoticeCategory, NoticeFilters, NoticeStatus, Pagination,
        UpdateNoticeRequest,
    },
    error::{AppError, Result},
    service::{NoticeListing, PaginationInfo, UploadedFile},
};

#[derive(Debug, Deserialize)]
pub struct ListNoticesQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    // Kept as strings: non-numeric input falls back to defaults instead of
    // rejecting the request.
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MineQuery {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct NoticeListResponse {
    pub success: bool,
    pub notices: Vec<Notice>,
    pub pagination: PaginationInfo,
}

impl From<NoticeListing> for NoticeListResponse {
    fn from(listing: NoticeListing) -> Self {
        Self {
            success: true,
            notices: listing.notices,
            pagination: listing.pagination,
        }
    }
}

#[derive(Serialize)]
pub struct NoticeResponse {
    pub success: bool,
    pub notice: Notice,
}

impl From<Notice> for NoticeResponse {
    fn from(notice: Notice) -> Self {
        Self {
            success: true,
            notice,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListNoticesQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<NoticeListResponse>> {
    let filters = NoticeFilters {
        category: params
            .category
            .as_deref()
            .map(NoticeCategory::parse)
            .transpose()?,
        search: params.search.filter(|s| !s.trim().is_empty()),
        status: params
            .status
            .as_deref()
            .map(NoticeStatus::parse)
            .transpose()?,
        pagination: Pagination::from_params(params.page.as_deref(), params.limit.as_deref()),
    };

    let identity = user.as_ref().map(|u| u.identity());
    let listing = state
        .service_context
        .notice_service
        .list(identity.as_ref(), filters)
        .await?;

    Ok(Json(listing.into()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<NoticeResponse>> {
    let identity = user.as_ref().map(|u| u.identity());
    let notice = state
        .service_context
        .notice_service
        .get(identity.as_ref(), id)
        .await?;

    Ok(Json(notice.into()))
}

pub async fn mine(
    State(state): State<AppState>,
    Query(params): Query<MineQuery>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NoticeListResponse>> {
    let status = params
        .status
        .as_deref()
        .map(NoticeStatus::parse)
        .transpose()?;
    let pagination = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());

    let listing = state
        .service_context
        .notice_service
        .list_mine(&user.identity(), status, pagination)
        .await?;

    Ok(Json(listing.into()))
}

pub async fn pending(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NoticeListResponse>> {
    let pagination = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());

    let listing = state
        .service_context
        .notice_service
        .list_pending(&user.identity(), pagination)
        .await?;

    Ok(Json(listing.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<NoticeResponse>)> {
    let form = read_notice_form(multipart).await?;

    let request = CreateNoticeRequest {
        title: form.title.unwrap_or_default(),
        description: form.description.unwrap_or_default(),
        category: form.category.unwrap_or_default(),
        status: form.status,
    };

    let notice = state
        .service_context
        .notice_service
        .create(&user.identity(), request, form.file)
        .await?;

    Ok((StatusCode::CREATED, Json(notice.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<NoticeResponse>> {
    let form = read_notice_form(multipart).await?;

    let request = UpdateNoticeRequest {
        title: form.title,
        description: form.description,
        category: form.category,
        status: form.status,
        rejection_reason: form.rejection_reason,
    };

    let notice = state
        .service_context
        .notice_service
        .update(&user.identity(), id, request, form.file)
        .await?;

    Ok(Json(notice.into()))
}

pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NoticeResponse>> {
    let notice = state
        .service_context
        .notice_service
        .submit(&user.identity(), id)
        .await?;

    Ok(Json(notice.into()))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NoticeResponse>> {
    let notice = state
        .service_context
        .notice_service
        .approve(&user.identity(), id)
        .await?;

    Ok(Json(notice.into()))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<CurrentUser>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<NoticeResponse>> {
    let reason = body.and_then(|Json(request)| request.reason);

    let notice = state
        .service_context
        .notice_service
        .reject(&user.identity(), id, reason.as_deref())
        .await?;

    Ok(Json(notice.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode> {
    state
        .service_context
        .notice_service
        .delete(&user.identity(), id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Default)]
struct NoticeForm {
    title: Option<String>,
    description: Option<String>,
    category: Option<NoticeCategory>,
    status: Option<NoticeStatus>,
    rejection_reason: Option<String>,
    file: Option<UploadedFile>,
}

async fn read_notice_form(mut multipart: Multipart) -> Result<NoticeForm> {
    let mut form = NoticeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = Some(field_text(field).await?),
            "description" => form.description = Some(field_text(field).await?),
            "category" => {
                form.category = Some(NoticeCategory::parse(&field_text(field).await?)?)
            }
            "status" => form.status = Some(NoticeStatus::parse(&field_text(field).await?)?),
            "rejection_reason" => form.rejection_reason = Some(field_text(field).await?),
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::BadRequest("File part needs a filename".to_string()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?
                    .to_vec();
                if !data.is_empty() {
                    form.file = Some(UploadedFile { filename, data });
                }
            }
            // Unknown parts are ignored, matching lenient form handling.
            _ => {}
        }
    }

    Ok(form)
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form field: {}", e)))
}
