//! 存储接口
//!
//! 业务层只依赖这里的 trait，具体实现有 Postgres 和进程内两种。

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewNotification, NewUser, Notification, Post, User};

pub use memory::{MemoryNotificationRepository, MemoryPostRepository, MemoryUserRepository};
pub use postgres::{PgNotificationRepository, PgPostRepository, PgUserRepository};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    /// 邮箱已被占用时返回 None，检查与写入是原子的
    async fn create(&self, user: NewUser) -> Result<Option<User>, sqlx::Error>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), sqlx::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error>;
    async fn list_all(&self) -> Result<Vec<Post>, sqlx::Error>;
    async fn list_by_author(&self, author: Uuid) -> Result<Vec<Post>, sqlx::Error>;
    /// 按创建时间倒序取前 `limit` 条
    async fn list_latest(&self, limit: usize) -> Result<Vec<Post>, sqlx::Error>;
    /// 整体覆盖保存，后写者胜出
    async fn save(&self, post: &Post) -> Result<(), sqlx::Error>;
    /// 返回是否确实删除了记录
    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification, sqlx::Error>;
    /// 按创建时间倒序
    async fn list_for(&self, recipient: Uuid) -> Result<Vec<Notification>, sqlx::Error>;
    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, sqlx::Error>;
    async fn unread_count(&self, recipient: Uuid) -> Result<i64, sqlx::Error>;
}

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            posts: Arc::new(MemoryPostRepository::default()),
            notifications: Arc::new(MemoryNotificationRepository::default()),
        }
    }
}
