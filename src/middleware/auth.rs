use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{AppState, config::Config, database::models::CurrentUser, error::AppError};

/// 会话令牌所在的 cookie 名
pub const SESSION_COOKIE: &str = "token";

/// 登录和注册时下发的会话 cookie
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(config.jwt_expiration_secs as i64))
        .build()
}

/// 退出登录时用于清除会话 cookie，路径需与下发时一致
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// 只从 cookie 读取令牌，校验通过且用户仍存在时把 `CurrentUser` 放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthenticated("No token, authorization denied"))?;

    let user_id = state.tokens.verify(&token).map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        AppError::Unauthenticated("Token is not valid")
    })?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthenticated("User not found"))?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(request).await)
}
