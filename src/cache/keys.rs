use uuid::Uuid;

/// 用户资料缓存键前缀
const USER_PROFILE_PREFIX: &str = "user_profile_";

/// 最新帖子缓存键
pub const LATEST_POSTS_KEY: &str = "latest_posts";

/// 生成用户资料缓存键
pub fn user_profile_key(user_id: &Uuid) -> String {
    format!("{}{}", USER_PROFILE_PREFIX, user_id)
}
