//! Request extractors: JSON bodies and the caller's identity.

use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::guard::{require_role, ADMIN_REQUIRED};
use crate::models::{Role, User};
use crate::state::AppState;

/// `axum::Json` whose rejections (bad syntax, wrong field types, missing
/// content type) come back in the usual `{"error"}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Any authenticated caller, as currently stored.
pub struct Identity(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?.to_owned();
        let authenticator = state.authenticator.clone();
        let user = state.blocking(move || authenticator.resolve(&token)).await?;
        Ok(Identity(user))
    }
}

/// Authenticated caller whose stored role is admin.
pub struct AdminIdentity(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Identity(user) = Identity::from_request_parts(parts, state).await?;
        require_role(&user, Role::Admin, ADMIN_REQUIRED)?;
        Ok(AdminIdentity(user))
    }
}
