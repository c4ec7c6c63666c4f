//! Signup and signin handlers.

use axum::extract::State;
use axum::Json;

use super::extract::JsonBody;
use super::MessageResponse;
use crate::error::ApiResult;
use crate::service::{SigninRequest, SigninResponse, SignupRequest};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = MessageResponse),
        (status = 422, description = "Missing fields, bad role or email already registered", body = crate::error::ErrorBody),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let accounts = state.accounts.clone();
    state.blocking(move || accounts.signup(req)).await?;
    Ok(Json(MessageResponse::new("saved successfully")))
}

#[utoipa::path(
    post,
    path = "/signin",
    tag = "auth",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Token and public user record", body = SigninResponse),
        (status = 422, description = "Missing fields or bad credentials", body = crate::error::ErrorBody),
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SigninRequest>,
) -> ApiResult<Json<SigninResponse>> {
    let accounts = state.accounts.clone();
    let response = state.blocking(move || accounts.signin(req)).await?;
    Ok(Json(response))
}
