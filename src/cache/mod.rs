// 缓存模块
// 进程级键值缓存，条目按 TTL 过期，值以 JSON 快照保存

pub mod keys;
mod memory;
mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 缓存后端
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 过期或不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入并重置插入时间
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// 带默认 TTL 的类型化缓存句柄
///
/// 写入时序列化为快照，读取时反序列化出新的值，
/// 调用方修改读出的对象不会影响缓存中的内容。
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    pub fn in_memory(default_ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()), default_ttl)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key).await? {
            Some(json) => {
                tracing::debug!("Cache hit: {}", key);
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                tracing::debug!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, json, ttl).await?;
        tracing::debug!("Set cache: {} (ttl {}s)", key, ttl.as_secs());
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key).await?;
        tracing::debug!("Invalidated cache: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        title: String,
        likes: Vec<u32>,
    }

    #[tokio::test]
    async fn returns_snapshots_not_live_references() {
        let cache = Cache::in_memory(Duration::from_secs(600));
        let mut original = Snapshot {
            title: "first".into(),
            likes: vec![1],
        };
        cache.set("snap", &original).await.unwrap();

        original.likes.push(2);
        let mut read: Snapshot = cache.get("snap").await.unwrap().unwrap();
        assert_eq!(read.likes, vec![1]);

        read.title = "mutated".into();
        let again: Snapshot = cache.get("snap").await.unwrap().unwrap();
        assert_eq!(again.title, "first");
    }

    #[tokio::test]
    async fn delete_removes_regardless_of_ttl() {
        let cache = Cache::in_memory(Duration::from_secs(600));
        cache.set("k", &42u32).await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get::<u32>("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_visible_until_ttl_then_absent() {
        let cache = Cache::in_memory(Duration::from_secs(600));
        cache
            .set_with_ttl("short", &"v", Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get::<String>("short").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get::<String>("short").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn set_resets_insertion_time() {
        let cache = Cache::in_memory(Duration::from_secs(10));
        cache.set("k", &1u32).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", &2u32).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get::<u32>("k").await.unwrap(), Some(2));
    }
}
