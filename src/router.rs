use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    infrastructure::uploads::UPLOADS_ROUTE,
    middleware::{auth_middleware, log_errors},
    routes,
};

/// 只允许配置的前端来源携带 cookie 跨域访问
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match origin.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!("Invalid CORS origin {:?}, CORS disabled: {}", origin, e);
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

pub fn create_router(state: AppState) -> Router {
    // 将路由分为公开路由和受保护路由
    let public_routes = Router::new()
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/posts/public", get(routes::post::public_posts))
        .route("/api/posts/latest", get(routes::post::latest_posts))
        .route("/api/posts/{id}", get(routes::post::get_post))
        .route(
            "/api/posts/comment/{post_id}",
            get(routes::post::list_comments),
        );

    let protected_routes = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/posts/create", post(routes::post::create_post))
        .route("/api/posts/my-posts", get(routes::post::my_posts))
        .route(
            "/api/posts/{id}",
            put(routes::post::update_post).delete(routes::post::delete_post),
        )
        .route("/api/posts/like/{post_id}", post(routes::post::toggle_like))
        .route(
            "/api/posts/comment/{post_id}",
            post(routes::post::add_comment),
        )
        .route(
            "/api/notifications",
            get(routes::notification::list_notifications),
        )
        .route(
            "/api/notifications/mark-read",
            put(routes::notification::mark_all_read),
        )
        .route(
            "/api/notifications/unread-count",
            get(routes::notification::unread_count),
        )
        // 应用认证中间件
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(from_fn(log_errors))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(&state.config.cors_origin) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}
