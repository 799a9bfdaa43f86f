use axum::{
    Extension,
    extract::State,
    response::IntoResponse,
};

use crate::{
    AppState, database::models::CurrentUser, error::AppError, utils::success_to_api_response,
};

use super::model::{MarkReadResponse, UnreadCountResponse};

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.notifications.list(user.id).await?;
    Ok(success_to_api_response(notifications))
}

#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.notifications.mark_all_read(user.id).await?;
    Ok(success_to_api_response(MarkReadResponse { updated }))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let count = state.notifications.unread_count(user.id).await?;
    Ok(success_to_api_response(UnreadCountResponse { count }))
}
