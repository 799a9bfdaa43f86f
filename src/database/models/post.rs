use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 内嵌在帖子里的评论，不单独存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// 帖子聚合：点赞集合与评论随帖子整体读写
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: Uuid,
    /// 作者用户名（冗余）
    pub username: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    /// 每个用户最多出现一次
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author: Uuid,
        username: String,
        title: String,
        content: String,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            username,
            title,
            content,
            image_url,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author == user_id
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// 切换点赞状态，返回切换后是否为已赞
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        match self.likes.iter().position(|id| *id == user_id) {
            Some(index) => {
                self.likes.remove(index);
                false
            }
            None => {
                self.likes.push(user_id);
                true
            }
        }
    }

    pub fn push_comment(&mut self, user: Uuid, username: String, text: String) -> &Comment {
        self.comments.push(Comment {
            id: Uuid::new_v4(),
            user,
            username,
            text,
            created_at: Utc::now(),
        });
        &self.comments[self.comments.len() - 1]
    }
}
