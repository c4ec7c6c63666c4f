//! Job, application and applicant-status handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::{AdminIdentity, Identity, JsonBody};
use super::MessageResponse;
use crate::error::ApiResult;
use crate::models::{ApplicantView, Job, JobStatusView, JobView};
use crate::service::JobRequest;
use crate::state::AppState;

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct JobEnvelope {
    pub job: Job,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct JobViewEnvelope {
    pub job: JobView,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct JobsEnvelope {
    pub jobs: Vec<JobView>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UpdateJobResponse {
    pub message: String,
    pub job: Job,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StatusRequest {
    /// One of `pending`, `approved`, `rejected`. Anything else, including a
    /// non-string value, is rejected with 400.
    #[schema(value_type = Option<String>)]
    pub status: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub message: String,
    pub job: Job,
    pub populated_applicants: Vec<ApplicantView>,
}

#[utoipa::path(
    post,
    path = "/create",
    tag = "jobs",
    request_body = JobRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Job created", body = JobEnvelope),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 422, description = "A required field is missing", body = crate::error::ErrorBody),
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    JsonBody(req): JsonBody<JobRequest>,
) -> ApiResult<Json<JobEnvelope>> {
    let jobs = state.jobs.clone();
    let job = state.blocking(move || jobs.create_job(&admin, req)).await?;
    Ok(Json(JobEnvelope { job }))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "jobs",
    responses((status = 200, description = "Every job with poster and applicants filled in", body = JobsEnvelope))
)]
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<JobsEnvelope>> {
    let jobs = state.jobs.clone();
    let jobs = state.blocking(move || jobs.list_jobs()).await?;
    Ok(Json(JobsEnvelope { jobs }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job", body = JobViewEnvelope),
        (status = 404, description = "No such job", body = crate::error::ErrorBody),
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobViewEnvelope>> {
    let jobs = state.jobs.clone();
    let job = state.blocking(move || jobs.get_job(&id)).await?;
    Ok(Json(JobViewEnvelope { job }))
}

#[utoipa::path(
    post,
    path = "/apply/{job_id}",
    tag = "jobs",
    params(("job_id" = String, Path, description = "Job id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Application recorded as pending", body = MessageResponse),
        (status = 400, description = "Already applied", body = crate::error::ErrorBody),
        (status = 403, description = "Admins cannot apply", body = crate::error::ErrorBody),
        (status = 404, description = "No such job", body = crate::error::ErrorBody),
    )
)]
pub async fn apply(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(job_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let jobs = state.jobs.clone();
    state.blocking(move || jobs.apply(&user, &job_id)).await?;
    Ok(Json(MessageResponse::new("Job application submitted successfully")))
}

#[utoipa::path(
    get,
    path = "/job-applicants/{job_id}",
    tag = "jobs",
    params(("job_id" = String, Path, description = "Job id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Applicants with their statuses", body = [ApplicantView]),
        (status = 403, description = "Not an admin, or not the job's poster", body = crate::error::ErrorBody),
        (status = 404, description = "No such job", body = crate::error::ErrorBody),
    )
)]
pub async fn job_applicants(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Vec<ApplicantView>>> {
    let jobs = state.jobs.clone();
    let applicants = state.blocking(move || jobs.applicants(&admin, &job_id)).await?;
    Ok(Json(applicants))
}

#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Job deleted", body = MessageResponse),
        (status = 403, description = "Not an admin, or not the job's poster", body = crate::error::ErrorBody),
        (status = 404, description = "No such job", body = crate::error::ErrorBody),
    )
)]
pub async fn delete_job(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let jobs = state.jobs.clone();
    state.blocking(move || jobs.delete_job(&admin, &id)).await?;
    Ok(Json(MessageResponse::new("Job deleted successfully")))
}

#[utoipa::path(
    put,
    path = "/update-job/{job_id}",
    tag = "jobs",
    params(("job_id" = String, Path, description = "Job id")),
    request_body = JobRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Job updated; absent or empty fields unchanged", body = UpdateJobResponse),
        (status = 403, description = "Not an admin, or not the job's poster", body = crate::error::ErrorBody),
        (status = 404, description = "No such job", body = crate::error::ErrorBody),
    )
)]
pub async fn update_job(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(job_id): Path<String>,
    JsonBody(req): JsonBody<JobRequest>,
) -> ApiResult<Json<UpdateJobResponse>> {
    let jobs = state.jobs.clone();
    let job = state.blocking(move || jobs.update_job(&admin, &job_id, req)).await?;
    Ok(Json(UpdateJobResponse {
        message: "Job updated successfully".to_string(),
        job,
    }))
}

#[utoipa::path(
    get,
    path = "/user/applied-jobs",
    tag = "jobs",
    security(("bearer" = [])),
    responses((status = 200, description = "Jobs the caller applied to, with status", body = [JobStatusView]))
)]
pub async fn applied_jobs(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> ApiResult<Json<Vec<JobStatusView>>> {
    let jobs = state.jobs.clone();
    let applied = state.blocking(move || jobs.applied_jobs(&user)).await?;
    Ok(Json(applied))
}

#[utoipa::path(
    put,
    path = "/admin/job-applicant-status/{job_id}/{applicant_id}",
    tag = "jobs",
    params(
        ("job_id" = String, Path, description = "Job id"),
        ("applicant_id" = String, Path, description = "Applicant's user id"),
    ),
    request_body = StatusRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Status written to the job and the applicant", body = StatusUpdateResponse),
        (status = 400, description = "Invalid status value", body = crate::error::ErrorBody),
        (status = 403, description = "Not an admin, or not the job's poster", body = crate::error::ErrorBody),
        (status = 404, description = "No such job or applicant", body = crate::error::ErrorBody),
    )
)]
pub async fn set_applicant_status(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path((job_id, applicant_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let status = req.status.and_then(|v| v.as_str().map(str::to_owned));
    let jobs = state.jobs.clone();
    let (job, populated_applicants) = state
        .blocking(move || jobs.set_applicant_status(&admin, &job_id, &applicant_id, status.as_deref()))
        .await?;
    Ok(Json(StatusUpdateResponse {
        message: "Status updated successfully".to_string(),
        job,
        populated_applicants,
    }))
}
