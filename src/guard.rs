//! Authorization guard: role gates and job ownership.

use crate::error::{ApiError, ApiResult};
use crate::models::{Job, Role, User};

pub const ADMIN_REQUIRED: &str = "Admin access required";

/// Fail with `Forbidden` unless `user` holds `role` (stored role, not the
/// token's claim). `message` is the operation-specific denial text.
pub fn require_role(user: &User, role: Role, message: &str) -> ApiResult<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(ApiError::forbidden(message))
    }
}

/// Fail with `Forbidden` unless `user` posted `job`. `message` is the
/// operation-specific denial text.
pub fn require_owner(user: &User, job: &Job, message: &str) -> ApiResult<()> {
    if job.is_owned_by(&user.id) {
        Ok(())
    } else {
        Err(ApiError::forbidden(message))
    }
}
