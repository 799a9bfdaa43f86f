use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{Cache, keys};
use crate::database::models::{NewUser, UserProfile};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::TokenService;
use crate::utils::{hash_password, verify_password};

/// 登录成功后返回的会话令牌和用户名
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub username: String,
}

#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
    cache: Cache,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: TokenService,
        cache: Cache,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            tokens,
            cache,
            bcrypt_cost,
        }
    }

    /// 注册并直接签发会话令牌
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username, email and password are required.".to_string(),
            ));
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        // bcrypt 是 CPU 密集操作，放到阻塞线程池
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

        // 上面的检查可能与并发注册交错，以存储层的原子写入为准
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?
            .ok_or_else(|| AppError::Conflict("User already exists".to_string()))?;

        tracing::info!("Registered user {}", user.id);
        Ok(self.tokens.issue(user.id)?)
    }

    /// 邮箱不存在和密码错误返回同一个错误
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let password = password.to_string();
        let password_hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await??;
        if !matches {
            tracing::debug!("Login attempt with wrong password for {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        Ok(LoginOutcome {
            token: self.tokens.issue(user.id)?,
            username: user.username,
        })
    }

    /// 先读缓存，未命中时查询存储并写回
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        let key = keys::user_profile_key(&user_id);
        match self.cache.get::<UserProfile>(&key).await {
            Ok(Some(profile)) => return Ok(profile),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read {} from cache: {}", key, e),
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;
        let profile = UserProfile::from(&user);

        if let Err(e) = self.cache.set(&key, &profile).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
        Ok(profile)
    }
}
