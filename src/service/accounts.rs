//! Signup and signin.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::provided;
use crate::auth::{hash_password, verify_password, Authenticator};
use crate::error::{ApiError, ApiResult};
use crate::models::{PublicUser, Role, User};
use crate::store::{Storage, StoreError};

const SIGNIN_FAILED: &str = "Invalid email or password";

#[derive(Deserialize, Serialize, Debug, Default, ToSchema)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `user` or `admin`
    pub role: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, ToSchema)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SigninResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct AccountService {
    storage: Storage,
    authenticator: Authenticator,
    bcrypt_cost: u32,
    /// Verified against when the email is unknown, so a miss costs the same
    /// bcrypt work as a wrong password.
    dummy_hash: Arc<str>,
}

impl AccountService {
    pub fn new(storage: Storage, authenticator: Authenticator, bcrypt_cost: u32) -> ApiResult<Self> {
        let dummy_hash = hash_password("jobboard-dummy-password", bcrypt_cost)
            .map_err(|e| ApiError::internal(format!("bcrypt setup: {}", e)))?;
        Ok(Self {
            storage,
            authenticator,
            bcrypt_cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn signup(&self, req: SignupRequest) -> ApiResult<User> {
        let (Some(name), Some(email), Some(password), Some(role)) = (
            provided(req.name),
            provided(req.email),
            provided(req.password),
            provided(req.role),
        ) else {
            return Err(ApiError::validation("please fill in all the details"));
        };
        let role: Role = role
            .parse()
            .map_err(|_| ApiError::validation("role must be 'user' or 'admin'"))?;

        let password_hash = hash_password(&password, self.bcrypt_cost)
            .map_err(|e| ApiError::internal(format!("bcrypt: {}", e)))?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            role,
            status: vec![],
            created_at: now,
            updated_at: now,
        };

        self.storage.create_user(&user).map_err(|e| match e {
            StoreError::EmailTaken => ApiError::Conflict("the user already exists".to_string()),
            other => other.into(),
        })?;
        info!(user_id = %user.id, role = %user.role, "user signed up");
        Ok(user)
    }

    /// Check credentials and issue a token. Unknown email and wrong password
    /// fail identically.
    pub fn signin(&self, req: SigninRequest) -> ApiResult<SigninResponse> {
        let (Some(email), Some(password)) = (provided(req.email), provided(req.password)) else {
            return Err(ApiError::validation("please add email or password"));
        };

        let user = self.storage.find_user_by_email(&email)?;
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(&*self.dummy_hash);
        let matches = verify_password(&password, hash).unwrap_or_else(|e| {
            warn!(error = %e, "stored password hash unreadable");
            false
        });

        let user = match user {
            Some(user) if matches => user,
            _ => return Err(ApiError::validation(SIGNIN_FAILED)),
        };

        let token = self
            .authenticator
            .issue_token(&user.id, user.role)
            .map_err(|e| ApiError::internal(format!("token signing: {}", e)))?;
        info!(user_id = %user.id, "user signed in");
        Ok(SigninResponse {
            token,
            user: PublicUser::from(&user),
        })
    }
}
