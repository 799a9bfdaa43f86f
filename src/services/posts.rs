//! 帖子聚合服务
//!
//! 负责帖子的创建、修改、删除、点赞和评论，并在会改变最新帖子列表的
//! 变更（创建、删除）返回前同步删除 `latest_posts` 缓存。
//! 修改、点赞、评论不删除该缓存，最新列表在 TTL 内可能滞后。

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::cache::{Cache, keys};
use crate::database::models::{Comment, CurrentUser, NewNotification, Post};
use crate::database::repositories::{PostRepository, UserRepository};
use crate::error::AppError;
use crate::infrastructure::{FileStorage, ImageUpload};

use super::NotificationService;

/// 创建或修改帖子时提交的内容
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    #[serde(rename = "likes")]
    pub like_count: usize,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
    uploads: Arc<dyn FileStorage>,
    cache: Cache,
    latest_limit: usize,
}

/// 标题和内容都不能为空
fn required_fields(input: &PostInput) -> Result<(String, String), AppError> {
    let title = input.title.as_deref().map(str::trim).unwrap_or_default();
    let content = input.content.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() || content.is_empty() {
        return Err(AppError::Validation(
            "Title and content are required.".to_string(),
        ));
    }
    Ok((title.to_string(), content.to_string()))
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        notifications: NotificationService,
        uploads: Arc<dyn FileStorage>,
        cache: Cache,
        latest_limit: usize,
    ) -> Self {
        Self {
            posts,
            users,
            notifications,
            uploads,
            cache,
            latest_limit,
        }
    }

    async fn store_image(&self, image: Option<ImageUpload>) -> Result<Option<String>, AppError> {
        match image {
            Some(upload) => Ok(Some(self.uploads.store(upload).await?)),
            None => Ok(None),
        }
    }

    async fn find_post(&self, id: Uuid) -> Result<Post, AppError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Post"))
    }

    /// 查找帖子并确认 actor 是作者
    async fn find_owned_post(&self, id: Uuid, actor: Uuid) -> Result<Post, AppError> {
        let post = self.find_post(id).await?;
        if !post.is_authored_by(actor) {
            tracing::warn!("User {} tried to modify post {} of {}", actor, id, post.author);
            return Err(AppError::Forbidden("post"));
        }
        Ok(post)
    }

    async fn invalidate_latest(&self) -> Result<(), AppError> {
        self.cache.delete(keys::LATEST_POSTS_KEY).await?;
        Ok(())
    }

    pub async fn create(&self, author: Uuid, input: PostInput) -> Result<Post, AppError> {
        let (title, content) = required_fields(&input)?;

        let user = self
            .users
            .find_by_id(author)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        let image_url = self.store_image(input.image).await?;
        let post = Post::new(user.id, user.username, title, content, image_url);
        self.posts.insert(&post).await?;
        self.invalidate_latest().await?;

        tracing::info!("Created post {} by {}", post.id, post.author);
        Ok(post)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, AppError> {
        self.find_post(id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.posts.list_all().await?)
    }

    pub async fn list_by_author(&self, author: Uuid) -> Result<Vec<Post>, AppError> {
        Ok(self.posts.list_by_author(author).await?)
    }

    /// 先读缓存，未命中时查询存储并写回快照
    pub async fn list_latest(&self) -> Result<Vec<Post>, AppError> {
        match self.cache.get::<Vec<Post>>(keys::LATEST_POSTS_KEY).await {
            Ok(Some(posts)) => return Ok(posts),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read latest posts from cache: {}", e),
        }

        let posts = self.posts.list_latest(self.latest_limit).await?;
        if let Err(e) = self.cache.set(keys::LATEST_POSTS_KEY, &posts).await {
            tracing::warn!("Failed to cache latest posts: {}", e);
        }
        Ok(posts)
    }

    /// 标题和内容整体替换，只有提交了新图片时才替换图片
    pub async fn update(&self, id: Uuid, actor: Uuid, input: PostInput) -> Result<Post, AppError> {
        let mut post = self.find_owned_post(id, actor).await?;
        let (title, content) = required_fields(&input)?;

        post.title = title;
        post.content = content;
        if let Some(image_url) = self.store_image(input.image).await? {
            post.image_url = Some(image_url);
        }

        self.posts.save(&post).await?;
        tracing::info!("Updated post {}", post.id);
        Ok(post)
    }

    pub async fn delete(&self, id: Uuid, actor: Uuid) -> Result<(), AppError> {
        self.find_owned_post(id, actor).await?;

        self.posts.delete(id).await?;
        self.invalidate_latest().await?;

        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    /// 每次调用都只依据当前状态判断，新增点赞且不是作者本人时通知作者
    pub async fn toggle_like(&self, id: Uuid, actor: &CurrentUser) -> Result<LikeOutcome, AppError> {
        let mut post = self.find_post(id).await?;

        let liked = post.toggle_like(actor.id);
        self.posts.save(&post).await?;

        if liked && !post.is_authored_by(actor.id) {
            self.notifications
                .emit(NewNotification::like(
                    post.author,
                    actor.id,
                    &actor.username,
                    post.id,
                ))
                .await;
        }

        Ok(LikeOutcome {
            liked,
            like_count: post.like_count(),
        })
    }

    pub async fn add_comment(
        &self,
        id: Uuid,
        actor: Uuid,
        text: &str,
    ) -> Result<Vec<Comment>, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment text is required.".to_string()));
        }

        let user = self
            .users
            .find_by_id(actor)
            .await?
            .ok_or(AppError::NotFound("User"))?;
        let mut post = self.find_post(id).await?;

        post.push_comment(user.id, user.username.clone(), text.to_string());
        self.posts.save(&post).await?;

        if !post.is_authored_by(user.id) {
            self.notifications
                .emit(NewNotification::comment(
                    post.author,
                    user.id,
                    &user.username,
                    post.id,
                ))
                .await;
        }

        Ok(post.comments)
    }

    pub async fn list_comments(&self, id: Uuid) -> Result<Vec<Comment>, AppError> {
        Ok(self.find_post(id).await?.comments)
    }
}
