pub mod notice_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::repository::{NoticeRepository, UserRepository};
use crate::storage::FileStore;

pub use notice_service::{NoticeListing, NoticeService, PaginationInfo, UploadedFile};

pub struct ServiceContext {
    pub notice_repo: Arc<dyn NoticeRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub notice_service: Arc<NoticeService>,
    pub auth_service: Arc<AuthService>,
    pub file_store: Arc<dyn FileStore>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        notice_repo: Arc<dyn NoticeRepository>,
        user_repo: Arc<dyn UserRepository>,
        file_store: Arc<dyn FileStore>,
        auth_service: Arc<AuthService>,
        db_pool: SqlitePool,
    ) -> Self {
        let notice_service = Arc::new(NoticeService::new(notice_repo.clone(), file_store.clone()));

        Self {
            notice_repo,
            user_repo,
            notice_service,
            auth_service,
            file_store,
            db_pool,
        }
    }
}
