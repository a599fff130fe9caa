use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    api::state::AppState,
    domain::{Identity, User},
    error::AppError,
    repository::{SqliteUserRepository, UserRepository},
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    pub fn identity(&self) -> Identity {
        self.user.identity()
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn resolve_user(state: &AppState, token: &str) -> Result<User, AppError> {
    let user_id = state.service_context.auth_service.verify_token(token)?;

    let user_repo = SqliteUserRepository::new(state.service_context.db_pool.clone());
    user_repo
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let user = resolve_user(&state, &token).await?;

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let user = resolve_user(&state, &token).await?;

    if !user.identity().is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// Attaches the caller when a valid token is present, otherwise lets the
/// request through anonymously. Listing and read endpoints use this so the
/// visibility rules can see who is asking.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request).map(str::to_string) {
        if let Ok(user) = resolve_user(&state, &token).await {
            request.extensions_mut().insert(CurrentUser { user });
        }
    }

    next.run(request).await
}
