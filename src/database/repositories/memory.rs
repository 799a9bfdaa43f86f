use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use uuid::Uuid;

use super::{NotificationRepository, PostRepository, UserRepository};
use crate::database::models::{NewNotification, NewUser, Notification, Post, User};

/// 进程内用户存储，`emails` 是邮箱到用户ID的唯一索引
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, user: NewUser) -> Result<Option<User>, sqlx::Error> {
        // 持有索引条目的写锁直到用户写入完成
        let slot = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Ok(None),
            Entry::Vacant(slot) => slot,
        };

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        slot.insert(user.id);

        tracing::info!("Created user: {}", user.id);
        Ok(Some(user))
    }
}

/// 进程内帖子存储，读出的都是副本
#[derive(Debug, Default)]
pub struct MemoryPostRepository {
    posts: DashMap<Uuid, Post>,
}

impl MemoryPostRepository {
    fn collect(&self, filter: impl Fn(&Post) -> bool) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), sqlx::Error> {
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        Ok(self.posts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_all(&self) -> Result<Vec<Post>, sqlx::Error> {
        Ok(self.collect(|_| true))
    }

    async fn list_by_author(&self, author: Uuid) -> Result<Vec<Post>, sqlx::Error> {
        Ok(self.collect(|post| post.author == author))
    }

    async fn list_latest(&self, limit: usize) -> Result<Vec<Post>, sqlx::Error> {
        let mut posts = self.collect(|_| true);
        // 创建时间相同时按ID排序，保证结果稳定
        posts.sort_by_key(|post| Reverse((post.created_at, post.id)));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn save(&self, post: &Post) -> Result<(), sqlx::Error> {
        // 与 UPDATE 一致：记录已被删除时不重新插入
        if let Some(mut existing) = self.posts.get_mut(&post.id) {
            *existing = post.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.posts.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotificationRepository {
    notifications: DashMap<Uuid, Notification>,
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn create(&self, notification: NewNotification) -> Result<Notification, sqlx::Error> {
        let notification = notification.into_notification();
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_for(&self, recipient: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        let mut list: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|entry| entry.recipient == recipient)
            .map(|entry| entry.value().clone())
            .collect();
        list.sort_by_key(|n| Reverse(n.created_at));
        Ok(list)
    }

    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, sqlx::Error> {
        let mut updated = 0;
        for mut entry in self.notifications.iter_mut() {
            if entry.recipient == recipient && !entry.is_read {
                entry.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn unread_count(&self, recipient: Uuid) -> Result<i64, sqlx::Error> {
        Ok(self
            .notifications
            .iter()
            .filter(|entry| entry.recipient == recipient && !entry.is_read)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_at(author: Uuid, offset_secs: i64) -> Post {
        let mut post = Post::new(author, "alice".into(), "t".into(), "c".into(), None);
        post.created_at = Utc::now() + chrono::Duration::seconds(offset_secs);
        post
    }

    #[tokio::test]
    async fn latest_sorted_newest_first_and_limited() {
        let repo = MemoryPostRepository::default();
        let author = Uuid::new_v4();
        let mut ids = Vec::new();
        for offset in 0..7 {
            let post = post_at(author, offset);
            ids.push(post.id);
            repo.insert(&post).await.unwrap();
        }

        let latest: Vec<Uuid> = repo
            .list_latest(5)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        let expected: Vec<Uuid> = ids.iter().rev().take(5).copied().collect();
        assert_eq!(latest, expected);
    }

    #[tokio::test]
    async fn latest_breaks_timestamp_ties_by_id() {
        let repo = MemoryPostRepository::default();
        let author = Uuid::new_v4();
        let created_at = Utc::now();
        for _ in 0..6 {
            let mut post = post_at(author, 0);
            post.created_at = created_at;
            repo.insert(&post).await.unwrap();
        }

        let first = repo.list_latest(5).await.unwrap();
        for _ in 0..10 {
            assert_eq!(repo.list_latest(5).await.unwrap(), first);
        }
        let ids: Vec<Uuid> = first.iter().map(|p| p.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted);
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: email.into(),
            password_hash: "x".into(),
        }
    }

    #[tokio::test]
    async fn create_user_rejects_taken_email() {
        let repo = MemoryUserRepository::default();
        let alice = repo
            .create(new_user("alice", "same@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert!(
            repo.create(new_user("mallory", "same@example.com"))
                .await
                .unwrap()
                .is_none()
        );

        let found = repo.find_by_email("same@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.username, "alice");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_with_same_email_claim_it_once() {
        let repo = std::sync::Arc::new(MemoryUserRepository::default());
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(new_user(&format!("user{}", i), "same@example.com"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap().is_some() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn save_after_delete_does_not_resurrect() {
        let repo = MemoryPostRepository::default();
        let post = post_at(Uuid::new_v4(), 0);
        repo.insert(&post).await.unwrap();
        assert!(repo.delete(post.id).await.unwrap());
        repo.save(&post).await.unwrap();
        assert_eq!(repo.find_by_id(post.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn mark_all_read_only_touches_recipient() {
        let repo = MemoryNotificationRepository::default();
        let (alice, bob, post) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        repo.create(NewNotification::like(alice, bob, "bob", post))
            .await
            .unwrap();
        repo.create(NewNotification::comment(alice, bob, "bob", post))
            .await
            .unwrap();
        repo.create(NewNotification::like(bob, alice, "alice", post))
            .await
            .unwrap();

        assert_eq!(repo.unread_count(alice).await.unwrap(), 2);
        assert_eq!(repo.mark_all_read(alice).await.unwrap(), 2);
        assert_eq!(repo.unread_count(alice).await.unwrap(), 0);
        assert_eq!(repo.unread_count(bob).await.unwrap(), 1);
    }
}
