//! Application state shared by every handler.

use std::sync::Arc;

use tracing::{error, warn};

use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::service::{AccountService, JobService, ProfileService};
use crate::store::Storage;

/// Holds the one store handle opened at startup and the services built on it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub authenticator: Authenticator,
    pub accounts: AccountService,
    pub jobs: JobService,
    pub profiles: ProfileService,
}

impl AppState {
    pub fn new(config: Config, storage: Storage) -> ApiResult<Self> {
        let authenticator = Authenticator::new(&config.jwt_secret, storage.clone());
        let accounts = AccountService::new(storage.clone(), authenticator.clone(), config.bcrypt_cost)?;
        let jobs = JobService::new(storage.clone());
        let profiles = ProfileService::new(storage.clone(), config.bcrypt_cost);

        Ok(Self {
            config: Arc::new(config),
            storage,
            authenticator,
            accounts,
            jobs,
            profiles,
        })
    }

    /// Run a store-bound operation on the blocking pool, giving up with
    /// `Unavailable` once `store_timeout` elapses. The operation itself is
    /// not cancelled; its result is dropped.
    pub async fn blocking<T, F>(&self, op: F) -> ApiResult<T>
    where
        F: FnOnce() -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::task::spawn_blocking(op);
        match tokio::time::timeout(self.config.store_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                error!(error = %join_err, "blocking task failed");
                Err(ApiError::internal(join_err.to_string()))
            }
            Err(_) => {
                warn!(timeout_ms = self.config.store_timeout.as_millis() as u64, "store operation timed out");
                Err(ApiError::Unavailable)
            }
        }
    }
}
