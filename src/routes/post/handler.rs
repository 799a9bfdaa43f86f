use axum::{
    Extension,
    extract::{Json, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState, database::models::CurrentUser, error::AppError, utils::success_to_api_response,
};

use super::model::{CommentRequest, DeletePostResponse, parse_post_id, read_post_form};

#[axum::debug_handler]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let input = read_post_form(multipart).await?;
    let post = state.posts.create(user.id, input).await?;
    Ok((StatusCode::CREATED, success_to_api_response(post)))
}

#[axum::debug_handler]
pub async fn public_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = state.posts.list_all().await?;
    Ok(success_to_api_response(posts))
}

#[axum::debug_handler]
pub async fn my_posts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let posts = state.posts.list_by_author(user.id).await?;
    Ok(success_to_api_response(posts))
}

#[axum::debug_handler]
pub async fn latest_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = state.posts.list_latest().await?;
    Ok(success_to_api_response(posts))
}

#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.posts.get(parse_post_id(&id)?).await?;
    Ok(success_to_api_response(post))
}

#[axum::debug_handler]
pub async fn update_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_post_id(&id)?;
    let input = read_post_form(multipart).await?;
    let post = state.posts.update(id, user.id, input).await?;
    Ok(success_to_api_response(post))
}

#[axum::debug_handler]
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.posts.delete(parse_post_id(&id)?, user.id).await?;
    Ok(success_to_api_response(DeletePostResponse {
        message: "Post deleted".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.posts.toggle_like(parse_post_id(&id)?, &user).await?;
    Ok(success_to_api_response(outcome))
}

#[axum::debug_handler]
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comments = state
        .posts
        .add_comment(parse_post_id(&id)?, user.id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, success_to_api_response(comments)))
}

#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let comments = state.posts.list_comments(parse_post_id(&id)?).await?;
    Ok(success_to_api_response(comments))
}
