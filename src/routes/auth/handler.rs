use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    database::models::CurrentUser,
    error::AppError,
    middleware::{removal_cookie, session_cookie},
    utils::success_to_api_response,
};

use super::model::{LoginRequest, LoginResponse, LogoutResponse, SignupRequest, SignupResponse};

/// 注册后自动登录：令牌既在响应体中返回，也写入会话 cookie
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = state
        .credentials
        .register(&req.username, &req.email, &req.password)
        .await?;

    let jar = jar.add(session_cookie(token.clone(), &state.config));
    Ok((
        StatusCode::CREATED,
        jar,
        success_to_api_response(SignupResponse { token }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.credentials.login(&req.email, &req.password).await?;

    let jar = jar.add(session_cookie(outcome.token, &state.config));
    Ok((
        jar,
        success_to_api_response(LoginResponse {
            message: "Logged in successfully".to_string(),
            username: outcome.username,
        }),
    ))
}

/// 只清除客户端 cookie，已签发的令牌在过期前仍然有效
#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(removal_cookie()),
        success_to_api_response(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.credentials.profile(user.id).await?;
    Ok(success_to_api_response(profile))
}
