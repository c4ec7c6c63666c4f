//! Persisted aggregates (User, Job), their embedded records, token claims,
//! and the denormalized views handed back over HTTP.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Application status, mirrored in `Job.applicants` and `User.status`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// One entry of a user's own status list (at most one per job).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct StatusEntry {
    pub job: String,
    #[serde(default)]
    pub status: ApplicationStatus,
}

/// User document stored in the `users` tree. Never serialized to clients
/// directly; see [`PublicUser`] and [`ProfileView`].
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: Vec<StatusEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Insert or overwrite the status recorded for `job_id`.
    pub fn upsert_status(&mut self, job_id: &str, status: ApplicationStatus) {
        match self.status.iter_mut().find(|entry| entry.job == job_id) {
            Some(entry) => entry.status = status,
            None => self.status.push(StatusEntry {
                job: job_id.to_string(),
                status,
            }),
        }
    }

    /// Drop the entry for `job_id`, returning whether one existed.
    pub fn remove_status(&mut self, job_id: &str) -> bool {
        let before = self.status.len();
        self.status.retain(|entry| entry.job != job_id);
        before != self.status.len()
    }

    pub fn status_for(&self, job_id: &str) -> Option<ApplicationStatus> {
        self.status
            .iter()
            .find(|entry| entry.job == job_id)
            .map(|entry| entry.status)
    }
}

/// Embedded applicant record inside a job (at most one per user).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Applicant {
    pub user: String,
    #[serde(default)]
    pub status: ApplicationStatus,
}

/// Job document stored in the `jobs` tree.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    pub posted_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn has_applicant(&self, user_id: &str) -> bool {
        self.applicants.iter().any(|a| a.user == user_id)
    }

    pub fn applicant_mut(&mut self, user_id: &str) -> Option<&mut Applicant> {
        self.applicants.iter_mut().find(|a| a.user == user_id)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.posted_by == user_id
    }
}

/// JWT claims. `iat` is informational; tokens carry no expiry.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
}

// --- Views returned over HTTP (never carry the password hash) ---

/// Poster identity embedded in job listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct PosterView {
    pub id: String,
    pub name: String,
}

/// Applicant identity embedded in job listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ApplicantUserView {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ApplicantView {
    /// `None` when the applicant's account can no longer be loaded.
    pub user: Option<ApplicantUserView>,
    pub status: ApplicationStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub posted_by: Option<PosterView>,
    pub applicants: Vec<ApplicantView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Signin payload's `user` object.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: Vec<StatusEntry>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status.clone(),
        }
    }
}

/// A job plus the caller's status on it. Shared by `/user/applied-jobs`
/// and the profile's `jobStatuses`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub status: ApplicationStatus,
}

impl JobStatusView {
    pub fn new(job: &Job, status: ApplicationStatus) -> Self {
        Self {
            job_id: job.id.clone(),
            title: job.title.clone(),
            description: job.description.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            status,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job_statuses: Vec<JobStatusView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            status: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_parsing_rejects_unknown_values() {
        assert_eq!("approved".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Approved));
        assert!("Approved".parse::<ApplicationStatus>().is_err());
        assert!("hired".parse::<ApplicationStatus>().is_err());
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_upsert_status_keeps_one_entry_per_job() {
        let mut user = sample_user();
        user.upsert_status("j1", ApplicationStatus::Pending);
        user.upsert_status("j1", ApplicationStatus::Rejected);
        user.upsert_status("j2", ApplicationStatus::Approved);

        assert_eq!(user.status.len(), 2);
        assert_eq!(user.status_for("j1"), Some(ApplicationStatus::Rejected));
        assert!(user.remove_status("j1"));
        assert!(!user.remove_status("j1"));
        assert_eq!(user.status_for("j1"), None);
    }

    #[test]
    fn test_public_user_omits_password() {
        let json = serde_json::to_value(PublicUser::from(&sample_user())).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }
}
