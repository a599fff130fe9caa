use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod notice_repository;
pub mod user_repository;

pub use notice_repository::SqliteNoticeRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait NoticeRepository: Send + Sync {
    async fn create(&self, notice: Notice) -> Result<Notice>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notice>>;
    async fn list(&self, query: &NoticeQuery) -> Result<Vec<Notice>>;
    async fn count(&self, query: &NoticeQuery) -> Result<i64>;
    async fn update(&self, id: Uuid, notice: Notice) -> Result<Notice>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}
