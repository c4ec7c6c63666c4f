//! Job-board backend.
//!
//! Users sign up as applicants or admins. Admins post jobs and review the
//! people who apply; applicants apply and follow their application status.
//! Everything lives in one embedded Sled database behind an axum REST API.

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
// REST API: axum handlers, extractors and the OpenAPI document
pub mod rest;
pub mod service;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use rest::create_router;
pub use state::AppState;
pub use store::Storage;
