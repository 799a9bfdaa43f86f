use std::sync::Arc;

use cache::Cache;
use config::Config;
use database::{Repositories, repositories::UserRepository};
use infrastructure::{FileStorage, TokenService};
use services::{CredentialService, NotificationService, PostService};

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub users: Arc<dyn UserRepository>,
    pub credentials: CredentialService,
    pub posts: PostService,
    pub notifications: NotificationService,
}

impl AppState {
    /// 用选定的存储、缓存和文件存储组装各个服务，缓存实例在服务间共享
    pub fn new(
        config: Config,
        repos: Repositories,
        cache: Cache,
        uploads: Arc<dyn FileStorage>,
    ) -> Self {
        let tokens = TokenService::from_config(&config);
        let notifications = NotificationService::new(repos.notifications.clone());
        let credentials = CredentialService::new(
            repos.users.clone(),
            tokens.clone(),
            cache.clone(),
            config.bcrypt_cost,
        );
        let posts = PostService::new(
            repos.posts.clone(),
            repos.users.clone(),
            notifications.clone(),
            uploads,
            cache,
            config.latest_posts_limit,
        );

        Self {
            config: Arc::new(config),
            tokens,
            users: repos.users,
            credentials,
            posts,
            notifications,
        }
    }
}
