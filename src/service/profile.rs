//! A user's own profile.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use super::provided;
use crate::auth::hash_password;
use crate::error::{ApiError, ApiResult};
use crate::models::{JobStatusView, ProfileView, User};
use crate::store::{ProfileChanges, Storage};

#[derive(Deserialize, Serialize, Debug, Default, ToSchema)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    storage: Storage,
    bcrypt_cost: u32,
}

impl ProfileService {
    pub fn new(storage: Storage, bcrypt_cost: u32) -> Self {
        Self {
            storage,
            bcrypt_cost,
        }
    }

    /// Change any of name, email, password. At least one is required; a new
    /// email must not belong to another user.
    pub fn update_profile(&self, user: &User, req: ProfileRequest) -> ApiResult<()> {
        let name = provided(req.name);
        let email = provided(req.email);
        let password = provided(req.password);
        if name.is_none() && email.is_none() && password.is_none() {
            return Err(ApiError::validation("Please provide at least one field to update."));
        }

        let password_hash = password
            .map(|p| hash_password(&p, self.bcrypt_cost))
            .transpose()
            .map_err(|e| ApiError::internal(format!("bcrypt: {}", e)))?;

        let changes = ProfileChanges {
            name,
            email,
            password_hash,
        };
        self.storage.update_profile(&user.id, &changes)?;
        info!(
            user_id = %user.id,
            name = changes.name.is_some(),
            email = changes.email.is_some(),
            password = changes.password_hash.is_some(),
            "profile updated"
        );
        Ok(())
    }

    /// Current profile with each status entry expanded to its job's fields.
    /// Entries pointing at jobs that no longer exist are left out.
    pub fn profile(&self, user: &User) -> ApiResult<ProfileView> {
        let user = self
            .storage
            .get_user(&user.id)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let mut job_statuses = Vec::with_capacity(user.status.len());
        for entry in &user.status {
            match self.storage.get_job(&entry.job)? {
                Some(job) => job_statuses.push(JobStatusView::new(&job, entry.status)),
                None => debug!(user_id = %user.id, job_id = %entry.job, "skipping status for missing job"),
            }
        }

        Ok(ProfileView {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
            job_statuses,
        })
    }
}
