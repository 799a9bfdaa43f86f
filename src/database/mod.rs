// 数据库模块
// 包含数据模型定义和存储接口

pub mod models;
pub mod repositories;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use repositories::Repositories;

/// 连接 Postgres 并执行迁移
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
