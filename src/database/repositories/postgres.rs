use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

use super::{NotificationRepository, PostRepository, UserRepository};
use crate::database::models::{
    Comment, NewNotification, NewUser, Notification, NotificationKind, Post, User,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";
const POST_COLUMNS: &str =
    "id, author, username, title, content, image_url, likes, comments, created_at";
const NOTIFICATION_COLUMNS: &str =
    "id, recipient, sender, post, kind, message, is_read, created_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create(&self, user: NewUser) -> Result<Option<User>, sqlx::Error> {
        let result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO NOTHING RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(user)) => {
                tracing::info!("Created user: {}", user.id);
                Ok(Some(user))
            }
            Ok(None) => {
                tracing::debug!("Email already registered");
                Ok(None)
            }
            Err(e) => {
                tracing::error!("Failed to create user: {:?}", e);
                Err(e)
            }
        }
    }
}

/// posts 表的行结构，点赞为 uuid[]，评论为 jsonb
#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    author: Uuid,
    username: String,
    title: String,
    content: String,
    image_url: Option<String>,
    likes: Vec<Uuid>,
    comments: Json<Vec<Comment>>,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author: row.author,
            username: row.username,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            likes: row.likes,
            comments: row.comments.0,
            created_at: row.created_at,
        }
    }
}

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO posts ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            POST_COLUMNS
        ))
        .bind(post.id)
        .bind(post.author)
        .bind(&post.username)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(&post.likes)
        .bind(Json(&post.comments))
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Post::from))
    }

    async fn list_all(&self) -> Result<Vec<Post>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PostRow>(&format!("SELECT {} FROM posts", POST_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_by_author(&self, author: Uuid) -> Result<Vec<Post>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE author = $1",
            POST_COLUMNS
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_latest(&self, limit: usize) -> Result<Vec<Post>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id DESC LIMIT $1",
            POST_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn save(&self, post: &Post) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, content = $3, image_url = $4, likes = $5, comments = $6
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(&post.likes)
        .bind(Json(&post.comments))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient: Uuid,
    sender: Uuid,
    post: Uuid,
    kind: String,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = sqlx::Error;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = NotificationKind::parse(&row.kind).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown notification kind: {}", row.kind).into())
        })?;

        Ok(Self {
            id: row.id,
            recipient: row.recipient,
            sender: row.sender,
            post: row.post,
            kind,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: NewNotification) -> Result<Notification, sqlx::Error> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "INSERT INTO notifications (id, recipient, sender, post, kind, message) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(notification.recipient)
        .bind(notification.sender)
        .bind(notification.post)
        .bind(notification.kind.as_str())
        .bind(&notification.message)
        .fetch_one(&self.pool)
        .await?;
        Notification::try_from(row)
    }

    async fn list_for(&self, recipient: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE recipient = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(recipient)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Notification::try_from)
        .collect()
    }

    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient = $1 AND is_read = FALSE",
        )
        .bind(recipient)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unread_count(&self, recipient: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND is_read = FALSE",
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await
    }
}
