//! Job store: job documents with embedded applicant lists.
//!
//! `add_applicant`, `set_applicant_status` and `delete_job` also touch the
//! affected users' status lists; both sides are written in one transaction.

use chrono::Utc;
use sled::transaction::Transactional;
use tracing::debug;

use super::{abort, decode, encode, tx_decode, tx_encode, Storage, StoreError, StoreResult};
use crate::models::{Applicant, ApplicationStatus, Job, User};

/// Partial job edit. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

impl Storage {
    pub fn insert_job(&self, job: &Job) -> StoreResult<()> {
        self.jobs.insert(job.id.as_bytes(), encode(job)?)?;
        debug!(job_id = %job.id, posted_by = %job.posted_by, "job inserted");
        Ok(())
    }

    pub fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
        match self.jobs.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All jobs, oldest first.
    pub fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        self.scan_jobs(|_| true)
    }

    /// Jobs whose applicant list contains `user_id`, oldest first.
    pub fn jobs_with_applicant(&self, user_id: &str) -> StoreResult<Vec<Job>> {
        self.scan_jobs(|job| job.has_applicant(user_id))
    }

    fn scan_jobs(&self, keep: impl Fn(&Job) -> bool) -> StoreResult<Vec<Job>> {
        let mut jobs = vec![];
        for item in self.jobs.iter() {
            let (_, value) = item?;
            let job: Job = decode(&value)?;
            if keep(&job) {
                jobs.push(job);
            }
        }
        // Keys are random UUIDs, so order by creation time instead
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(jobs)
    }

    /// Apply a partial edit to the job's own fields and return the result.
    pub fn update_job(&self, id: &str, changes: &JobChanges) -> StoreResult<Job> {
        let job = self
            .jobs
            .transaction(|jobs| {
                let Some(bytes) = jobs.get(id.as_bytes())? else {
                    return abort(StoreError::JobNotFound);
                };
                let mut job: Job = tx_decode(&bytes)?;
                if let Some(title) = &changes.title {
                    job.title = title.clone();
                }
                if let Some(description) = &changes.description {
                    job.description = description.clone();
                }
                if let Some(company) = &changes.company {
                    job.company = company.clone();
                }
                if let Some(location) = &changes.location {
                    job.location = location.clone();
                }
                job.updated_at = Utc::now();
                jobs.insert(id.as_bytes(), tx_encode(&job)?)?;
                Ok(job)
            })
            .map_err(StoreError::from)?;
        Ok(job)
    }

    /// Remove the job and the status entries applicants hold for it.
    pub fn delete_job(&self, id: &str) -> StoreResult<Job> {
        let job = (&self.jobs, &self.users)
            .transaction(|(jobs, users)| {
                let Some(bytes) = jobs.remove(id.as_bytes())? else {
                    return abort(StoreError::JobNotFound);
                };
                let job: Job = tx_decode(&bytes)?;
                for applicant in &job.applicants {
                    if let Some(user_bytes) = users.get(applicant.user.as_bytes())? {
                        let mut user: User = tx_decode(&user_bytes)?;
                        if user.remove_status(id) {
                            user.updated_at = Utc::now();
                            users.insert(user.id.as_bytes(), tx_encode(&user)?)?;
                        }
                    }
                }
                Ok(job)
            })
            .map_err(StoreError::from)?;
        debug!(job_id = id, applicants = job.applicants.len(), "job deleted");
        Ok(job)
    }

    /// Append `user_id` as a pending applicant and record the matching
    /// pending entry in the user's status list. The absence check and both
    /// writes are one transaction, so concurrent applies cannot both succeed.
    pub fn add_applicant(&self, job_id: &str, user_id: &str) -> StoreResult<Job> {
        let job = (&self.jobs, &self.users)
            .transaction(|(jobs, users)| {
                let Some(job_bytes) = jobs.get(job_id.as_bytes())? else {
                    return abort(StoreError::JobNotFound);
                };
                let Some(user_bytes) = users.get(user_id.as_bytes())? else {
                    return abort(StoreError::UserNotFound);
                };
                let mut job: Job = tx_decode(&job_bytes)?;
                let mut user: User = tx_decode(&user_bytes)?;

                if job.has_applicant(user_id) {
                    return abort(StoreError::AlreadyApplied);
                }

                let now = Utc::now();
                job.applicants.push(Applicant {
                    user: user_id.to_string(),
                    status: ApplicationStatus::Pending,
                });
                job.updated_at = now;
                user.upsert_status(job_id, ApplicationStatus::Pending);
                user.updated_at = now;

                jobs.insert(job_id.as_bytes(), tx_encode(&job)?)?;
                users.insert(user_id.as_bytes(), tx_encode(&user)?)?;
                Ok(job)
            })
            .map_err(StoreError::from)?;
        debug!(job_id, user_id, "applicant added");
        Ok(job)
    }

    /// Set the applicant's status on the job and mirror it into the
    /// applicant's own status list in a single transaction. A missing user
    /// document only skips the mirror write.
    pub fn set_applicant_status(
        &self,
        job_id: &str,
        applicant_id: &str,
        status: ApplicationStatus,
    ) -> StoreResult<Job> {
        let job = (&self.jobs, &self.users)
            .transaction(|(jobs, users)| {
                let Some(job_bytes) = jobs.get(job_id.as_bytes())? else {
                    return abort(StoreError::JobNotFound);
                };
                let mut job: Job = tx_decode(&job_bytes)?;
                let now = Utc::now();

                match job.applicant_mut(applicant_id) {
                    Some(applicant) => applicant.status = status,
                    None => return abort(StoreError::ApplicantNotFound),
                }
                job.updated_at = now;
                jobs.insert(job_id.as_bytes(), tx_encode(&job)?)?;

                if let Some(user_bytes) = users.get(applicant_id.as_bytes())? {
                    let mut user: User = tx_decode(&user_bytes)?;
                    user.upsert_status(job_id, status);
                    user.updated_at = now;
                    users.insert(applicant_id.as_bytes(), tx_encode(&user)?)?;
                }
                Ok(job)
            })
            .map_err(StoreError::from)?;
        debug!(job_id, applicant_id, %status, "applicant status synced");
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::fixtures::{job, user};

    fn seeded() -> Storage {
        let storage = Storage::temporary().unwrap();
        storage.create_user(&user("admin", "admin@example.com", Role::Admin)).unwrap();
        storage.create_user(&user("u1", "u1@example.com", Role::User)).unwrap();
        storage.create_user(&user("u2", "u2@example.com", Role::User)).unwrap();
        storage.insert_job(&job("j1", "admin")).unwrap();
        storage
    }

    #[test]
    fn test_apply_writes_both_documents() {
        let storage = seeded();
        storage.add_applicant("j1", "u1").unwrap();

        let job = storage.get_job("j1").unwrap().unwrap();
        assert_eq!(job.applicants, vec![Applicant {
            user: "u1".to_string(),
            status: ApplicationStatus::Pending,
        }]);
        let u1 = storage.get_user("u1").unwrap().unwrap();
        assert_eq!(u1.status_for("j1"), Some(ApplicationStatus::Pending));
    }

    #[test]
    fn test_second_apply_is_rejected() {
        let storage = seeded();
        storage.add_applicant("j1", "u1").unwrap();

        let err = storage.add_applicant("j1", "u1").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyApplied));
        assert_eq!(storage.get_job("j1").unwrap().unwrap().applicants.len(), 1);
    }

    #[test]
    fn test_apply_to_missing_job() {
        let storage = seeded();
        let err = storage.add_applicant("nope", "u1").unwrap_err();
        assert!(matches!(err, StoreError::JobNotFound));
    }

    #[test]
    fn test_concurrent_applies_record_one_entry() {
        let storage = seeded();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = storage.clone();
                std::thread::spawn(move || storage.add_applicant("j1", "u1").is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(storage.get_job("j1").unwrap().unwrap().applicants.len(), 1);
    }

    #[test]
    fn test_status_change_is_mirrored() {
        let storage = seeded();
        storage.add_applicant("j1", "u1").unwrap();
        storage.add_applicant("j1", "u2").unwrap();

        let job = storage
            .set_applicant_status("j1", "u1", ApplicationStatus::Approved)
            .unwrap();
        assert_eq!(job.applicants[0].status, ApplicationStatus::Approved);
        assert_eq!(job.applicants[1].status, ApplicationStatus::Pending);

        let u1 = storage.get_user("u1").unwrap().unwrap();
        assert_eq!(u1.status_for("j1"), Some(ApplicationStatus::Approved));
        let u2 = storage.get_user("u2").unwrap().unwrap();
        assert_eq!(u2.status_for("j1"), Some(ApplicationStatus::Pending));
    }

    #[test]
    fn test_status_for_non_applicant_changes_nothing() {
        let storage = seeded();
        storage.add_applicant("j1", "u1").unwrap();

        let err = storage
            .set_applicant_status("j1", "u2", ApplicationStatus::Rejected)
            .unwrap_err();
        assert!(matches!(err, StoreError::ApplicantNotFound));
        assert_eq!(storage.get_user("u2").unwrap().unwrap().status_for("j1"), None);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let storage = seeded();
        let changes = JobChanges {
            title: Some("Staff Engineer".to_string()),
            ..Default::default()
        };
        let job = storage.update_job("j1", &changes).unwrap();
        assert_eq!(job.title, "Staff Engineer");
        assert_eq!(job.company, "Acme");
        assert!(job.updated_at >= job.created_at);
    }

    #[test]
    fn test_delete_clears_applicant_status_entries() {
        let storage = seeded();
        storage.insert_job(&job("j2", "admin")).unwrap();
        storage.add_applicant("j1", "u1").unwrap();
        storage.add_applicant("j2", "u1").unwrap();

        storage.delete_job("j1").unwrap();

        assert!(storage.get_job("j1").unwrap().is_none());
        let u1 = storage.get_user("u1").unwrap().unwrap();
        assert_eq!(u1.status_for("j1"), None);
        assert_eq!(u1.status_for("j2"), Some(ApplicationStatus::Pending));
        assert!(matches!(storage.delete_job("j1").unwrap_err(), StoreError::JobNotFound));
    }

    #[test]
    fn test_jobs_with_applicant_filters() {
        let storage = seeded();
        storage.insert_job(&job("j2", "admin")).unwrap();
        storage.add_applicant("j2", "u2").unwrap();

        let jobs = storage.jobs_with_applicant("u2").unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "j2");
        assert!(storage.jobs_with_applicant("u1").unwrap().is_empty());
        assert_eq!(storage.list_jobs().unwrap().len(), 2);
    }
}
