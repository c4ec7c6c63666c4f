//! Business operations over the store. Everything here is synchronous and
//! may block on Sled or bcrypt; the HTTP layer runs it on the blocking pool
//! (see [`AppState::blocking`](crate::state::AppState::blocking)).

pub mod accounts;
pub mod jobs;
pub mod profile;

pub use accounts::{AccountService, SigninRequest, SigninResponse, SignupRequest};
pub use jobs::{JobRequest, JobService};
pub use profile::{ProfileRequest, ProfileService};

/// Absent and empty values both count as "not provided".
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
