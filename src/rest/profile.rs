//! Profile handlers for the authenticated caller.

use axum::extract::State;
use axum::Json;

use super::extract::{Identity, JsonBody};
use super::MessageResponse;
use crate::error::ApiResult;
use crate::models::ProfileView;
use crate::service::ProfileRequest;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/update-profile",
    tag = "profile",
    request_body = ProfileRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 422, description = "No field given, or email taken", body = crate::error::ErrorBody),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Identity(user): Identity,
    JsonBody(req): JsonBody<ProfileRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let profiles = state.profiles.clone();
    state.blocking(move || profiles.update_profile(&user, req)).await?;
    Ok(Json(MessageResponse::new("Profile updated successfully.")))
}

#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile with job statuses", body = ProfileView),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> ApiResult<Json<ProfileView>> {
    let profiles = state.profiles.clone();
    let view = state.blocking(move || profiles.profile(&user)).await?;
    Ok(Json(view))
}
