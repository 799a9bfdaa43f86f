use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use blog_backend::{
    AppState,
    cache::{Cache, CacheStore, MemoryCacheStore, RedisCacheStore},
    config::Config,
    database::{self, Repositories},
    infrastructure::LocalFileStorage,
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("JWT_SECRET must be set");

    // 设置存储
    let repos = match &config.database_url {
        Some(url) => {
            let pool = database::connect(url)
                .await
                .expect("Failed to connect to Postgres");
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            Repositories::in_memory()
        }
    };

    // 设置缓存
    let store: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCacheStore::open(url).expect("Failed to create Redis client")),
        None => {
            tracing::info!("REDIS_URL not set, using in-process cache");
            let store = Arc::new(MemoryCacheStore::new());
            if let Some(every) = config.cache_sweep_interval() {
                store.clone().spawn_sweeper(every);
            }
            store
        }
    };
    let cache = Cache::new(store, config.cache_ttl());

    // 设置上传目录
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");
    let uploads = Arc::new(LocalFileStorage::new(&config.upload_dir));

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to 0.0.0.0");
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        }),
        config.server_port,
    );

    let state = AppState::new(config, repos, cache, uploads);
    let app = create_router(state);

    // 启动服务器
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
