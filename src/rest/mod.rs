//! REST API layer: axum routes over the job-board services.
//!
//! Authenticated routes take an [`extract::Identity`] or
//! [`extract::AdminIdentity`] argument instead of sitting behind a route
//! layer, so each handler states the access it needs in its signature.

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::error::ErrorBody;
use crate::models::{
    Applicant, ApplicantUserView, ApplicantView, ApplicationStatus, Job, JobStatusView, JobView,
    PosterView, ProfileView, PublicUser, Role, StatusEntry,
};
use crate::service::{JobRequest, ProfileRequest, SigninRequest, SigninResponse, SignupRequest};
use crate::state::AppState;

mod accounts;
pub mod extract;
mod jobs;
mod profile;

pub use jobs::{
    JobEnvelope, JobViewEnvelope, JobsEnvelope, StatusRequest, StatusUpdateResponse,
    UpdateJobResponse,
};

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::signup,
        accounts::signin,
        jobs::create_job,
        jobs::list_jobs,
        jobs::get_job,
        jobs::apply,
        jobs::job_applicants,
        jobs::delete_job,
        jobs::update_job,
        jobs::applied_jobs,
        jobs::set_applicant_status,
        profile::update_profile,
        profile::profile,
        health,
    ),
    components(schemas(
        SignupRequest, SigninRequest, SigninResponse, JobRequest, ProfileRequest, StatusRequest,
        MessageResponse, HealthResponse, ErrorBody, Job, JobView, Applicant, ApplicantView,
        ApplicantUserView, PosterView, PublicUser, StatusEntry, JobStatusView, ProfileView, Role,
        ApplicationStatus, JobEnvelope, JobViewEnvelope, JobsEnvelope, UpdateJobResponse,
        StatusUpdateResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup and signin"),
        (name = "jobs", description = "Job postings, applications and applicant status"),
        (name = "profile", description = "The caller's own account"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/signup", post(accounts::signup))
        .route("/signin", post(accounts::signin))
        .route("/create", post(jobs::create_job))
        .route("/all", get(jobs::list_jobs))
        .route("/apply/:job_id", post(jobs::apply))
        .route("/job-applicants/:job_id", get(jobs::job_applicants))
        .route("/delete/:id", delete(jobs::delete_job))
        .route("/update-job/:job_id", put(jobs::update_job))
        .route("/user/applied-jobs", get(jobs::applied_jobs))
        .route("/user/profile", get(profile::profile))
        .route("/update-profile", post(profile::update_profile))
        .route(
            "/admin/job-applicant-status/:job_id/:applicant_id",
            put(jobs::set_applicant_status),
        )
        .route("/:id", get(jobs::get_job))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "jobs",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string() })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
