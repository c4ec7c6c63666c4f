//! Job postings, applications and applicant status management.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::provided;
use crate::error::{ApiError, ApiResult};
use crate::guard::{require_owner, require_role, ADMIN_REQUIRED};
use crate::models::{
    ApplicantUserView, ApplicantView, ApplicationStatus, Job, JobStatusView, JobView, PosterView,
    Role, User,
};
use crate::store::{JobChanges, Storage, StoreResult};

/// Body for creating (all fields required) or updating (any subset) a job.
#[derive(Deserialize, Serialize, Debug, Default, Clone, ToSchema)]
pub struct JobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct JobService {
    storage: Storage,
}

impl JobService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn create_job(&self, admin: &User, req: JobRequest) -> ApiResult<Job> {
        require_role(admin, Role::Admin, ADMIN_REQUIRED)?;
        let (Some(title), Some(description), Some(company), Some(location)) = (
            provided(req.title),
            provided(req.description),
            provided(req.company),
            provided(req.location),
        ) else {
            return Err(ApiError::validation("Please fill in all fields"));
        };

        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            company,
            location,
            applicants: vec![],
            posted_by: admin.id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_job(&job)?;
        info!(job_id = %job.id, admin_id = %admin.id, "job created");
        Ok(job)
    }

    /// Every job with poster and applicant identities filled in.
    pub fn list_jobs(&self) -> ApiResult<Vec<JobView>> {
        let jobs = self.storage.list_jobs()?;
        let mut directory = Directory::new(&self.storage);
        let views = jobs
            .iter()
            .map(|job| directory.job_view(job))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(views)
    }

    pub fn get_job(&self, id: &str) -> ApiResult<JobView> {
        let job = self.load(id)?;
        Ok(Directory::new(&self.storage).job_view(&job)?)
    }

    /// Partial update. Absent or empty fields keep their stored value.
    pub fn update_job(&self, admin: &User, id: &str, req: JobRequest) -> ApiResult<Job> {
        require_role(admin, Role::Admin, ADMIN_REQUIRED)?;
        let job = self.load(id)?;
        require_owner(admin, &job, "You can only update jobs you created")?;

        let changes = JobChanges {
            title: provided(req.title),
            description: provided(req.description),
            company: provided(req.company),
            location: provided(req.location),
        };
        let job = self.storage.update_job(id, &changes)?;
        info!(job_id = id, admin_id = %admin.id, "job updated");
        Ok(job)
    }

    pub fn delete_job(&self, admin: &User, id: &str) -> ApiResult<()> {
        require_role(admin, Role::Admin, ADMIN_REQUIRED)?;
        let job = self.load(id)?;
        require_owner(admin, &job, "Not authorized to delete this job")?;

        self.storage.delete_job(id)?;
        info!(job_id = id, admin_id = %admin.id, "job deleted");
        Ok(())
    }

    /// Apply as `user`. Admins cannot apply; applying twice fails.
    pub fn apply(&self, user: &User, job_id: &str) -> ApiResult<()> {
        require_role(user, Role::User, "Admins cannot apply for jobs")?;
        self.storage.add_applicant(job_id, &user.id)?;
        info!(job_id, user_id = %user.id, "application submitted");
        Ok(())
    }

    pub fn applicants(&self, admin: &User, job_id: &str) -> ApiResult<Vec<ApplicantView>> {
        require_role(admin, Role::Admin, ADMIN_REQUIRED)?;
        let job = self.load(job_id)?;
        require_owner(admin, &job, "You can only access jobs you created")?;

        Ok(Directory::new(&self.storage).applicant_views(&job)?)
    }

    /// Jobs `user` applied to, with the status taken from each job's
    /// applicant list.
    pub fn applied_jobs(&self, user: &User) -> ApiResult<Vec<JobStatusView>> {
        let jobs = self.storage.jobs_with_applicant(&user.id)?;
        Ok(jobs
            .iter()
            .map(|job| {
                let status = job
                    .applicants
                    .iter()
                    .find(|a| a.user == user.id)
                    .map(|a| a.status)
                    .unwrap_or_default();
                JobStatusView::new(job, status)
            })
            .collect())
    }

    /// Set an applicant's status. The job's applicant entry and the
    /// applicant's own status entry are written together.
    pub fn set_applicant_status(
        &self,
        admin: &User,
        job_id: &str,
        applicant_id: &str,
        status: Option<&str>,
    ) -> ApiResult<(Job, Vec<ApplicantView>)> {
        let status: ApplicationStatus = status
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ApiError::bad_request("Invalid status value"))?;
        require_role(admin, Role::Admin, ADMIN_REQUIRED)?;
        let job = self.load(job_id)?;
        require_owner(admin, &job, "You are not authorized to manage this job")?;

        let job = self.storage.set_applicant_status(job_id, applicant_id, status)?;
        info!(job_id, applicant_id, %status, admin_id = %admin.id, "applicant status updated");

        let applicants = Directory::new(&self.storage).applicant_views(&job)?;
        Ok((job, applicants))
    }

    fn load(&self, id: &str) -> ApiResult<Job> {
        self.storage
            .get_job(id)?
            .ok_or_else(|| ApiError::not_found("Job not found"))
    }
}

/// Per-request user lookup cache used to fill in poster and applicant
/// identities.
struct Directory<'a> {
    storage: &'a Storage,
    users: HashMap<String, Option<User>>,
}

impl<'a> Directory<'a> {
    fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            users: HashMap::new(),
        }
    }

    fn user(&mut self, id: &str) -> StoreResult<Option<&User>> {
        if !self.users.contains_key(id) {
            let user = self.storage.get_user(id)?;
            self.users.insert(id.to_string(), user);
        }
        Ok(self.users.get(id).and_then(Option::as_ref))
    }

    fn applicant_views(&mut self, job: &Job) -> StoreResult<Vec<ApplicantView>> {
        job.applicants
            .iter()
            .map(|applicant| {
                let user = self.user(&applicant.user)?.map(|u| ApplicantUserView {
                    id: u.id.clone(),
                    name: u.name.clone(),
                    email: u.email.clone(),
                });
                Ok(ApplicantView {
                    user,
                    status: applicant.status,
                })
            })
            .collect()
    }

    fn job_view(&mut self, job: &Job) -> StoreResult<JobView> {
        let posted_by = self.user(&job.posted_by)?.map(|u| PosterView {
            id: u.id.clone(),
            name: u.name.clone(),
        });
        Ok(JobView {
            id: job.id.clone(),
            title: job.title.clone(),
            description: job.description.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            posted_by,
            applicants: self.applicant_views(job)?,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }
}
