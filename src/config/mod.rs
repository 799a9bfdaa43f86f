use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 会话令牌有效期，单位秒
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 3600;
/// 缓存默认过期时间，单位秒
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
/// 最新帖子快照大小
pub const DEFAULT_LATEST_POSTS_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_sweep_interval_secs: u64,
    pub latest_posts_limit: usize,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: optional_var("DATABASE_URL"),
            redis_url: optional_var("REDIS_URL"),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: parse_var("JWT_EXPIRATION", DEFAULT_JWT_EXPIRATION_SECS),
            cache_ttl_secs: parse_var("CACHE_TTL", DEFAULT_CACHE_TTL_SECS),
            cache_sweep_interval_secs: parse_var("CACHE_SWEEP_INTERVAL", 60),
            latest_posts_limit: parse_var("LATEST_POSTS_LIMIT", DEFAULT_LATEST_POSTS_LIMIT),
            upload_dir: optional_var("UPLOAD_DIR").unwrap_or_else(|| "uploads".into()),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            cors_origin: optional_var("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".into()),
            cookie_secure: parse_var("COOKIE_SECURE", false),
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST),
            server_host: optional_var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_var("SERVER_PORT", 5000),
        })
    }

    /// 本地运行配置：内存存储、内存缓存，仅需提供签名密钥
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Config {
            database_url: None,
            redis_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_sweep_interval_secs: 0,
            latest_posts_limit: DEFAULT_LATEST_POSTS_LIMIT,
            upload_dir: "uploads".into(),
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origin: "http://localhost:3000".into(),
            cookie_secure: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            server_host: "127.0.0.1".into(),
            server_port: 5000,
        }
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// 为 0 时不启动后台清理任务
    pub fn cache_sweep_interval(&self) -> Option<Duration> {
        (self.cache_sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.cache_sweep_interval_secs))
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match optional_var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}, using default", key);
            default
        }),
        None => default,
    }
}
