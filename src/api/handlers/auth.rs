use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::AuthService,
    domain::{CreateUserRequest, Role, User},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub student_id: Option<String>,
    pub department: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            roles: user.roles,
            student_id: user.student_id,
            department: user.department,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Same error for unknown email and wrong password.
    let user = state
        .service_context
        .user_repo
        .find_by_email(&request.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&request.password, &user.password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let token = state.service_context.auth_service.issue_token(user.id)?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: user.into(),
    }))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(current.user.into())
}

/// Admin-only account provisioning for staff and other admins.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if request.roles.is_empty() {
        return Err(AppError::Validation(
            "At least one role is required".to_string(),
        ));
    }

    if state
        .service_context
        .user_repo
        .find_by_email(&request.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: request.name,
        email: request.email,
        password_hash: AuthService::hash_password(&request.password).await?,
        roles: request.roles,
        student_id: request.student_id,
        department: request.department,
        is_verified: true,
        created_at: now,
        updated_at: now,
    };

    let created = state.service_context.user_repo.create(user).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}
