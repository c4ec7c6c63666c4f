//! Document store on Sled.
//!
//! Three trees hold the data:
//! - `users`: user id -> JSON [`User`](crate::models::User)
//! - `jobs`: job id -> JSON [`Job`](crate::models::Job), applicants embedded
//! - `emails`: email -> user id, the uniqueness index for signup/profile edits
//!
//! Writes touching more than one document (apply, status sync, job delete,
//! email changes) run as Sled multi-tree transactions, so the status mirrored
//! in a job's applicant list and in the user's own status list never diverge.

mod jobs;
mod users;

pub use jobs::JobChanges;
pub use users::ProfileChanges;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Tree};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("document encoding error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("corrupt document: {0}")]
    Corrupt(String),

    #[error("email already registered")]
    EmailTaken,

    #[error("job not found")]
    JobNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("applicant not found for job")]
    ApplicantNotFound,

    #[error("user already applied to job")]
    AlreadyApplied,
}

impl From<TransactionError<StoreError>> for StoreError {
    fn from(err: TransactionError<StoreError>) -> Self {
        match err {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => StoreError::Sled(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result type inside a transaction closure.
type TxResult<T> = Result<T, ConflictableTransactionError<StoreError>>;

/// Shared handle to the store. Cloning is cheap (Sled trees are Arc-backed),
/// so one handle opened at startup is cloned into every service.
#[derive(Clone)]
pub struct Storage {
    db: Db,
    users: Tree,
    jobs: Tree,
    emails: Tree,
}

impl Storage {
    /// Open or create the Sled database at `path`.
    pub fn open(path: &str) -> StoreResult<Self> {
        let db = sled::open(path)?;
        info!(path, "opened document store");
        Self::with_db(db)
    }

    /// In-memory store removed on drop; used by tests and dry runs.
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_db(db)
    }

    fn with_db(db: Db) -> StoreResult<Self> {
        let users = db.open_tree("users")?;
        let jobs = db.open_tree("jobs")?;
        let emails = db.open_tree("emails")?;
        Ok(Self {
            db,
            users,
            jobs,
            emails,
        })
    }

    /// Flush dirty pages to disk; called on graceful shutdown.
    pub fn flush(&self) -> StoreResult<usize> {
        Ok(self.db.flush()?)
    }
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

fn tx_encode<T: Serialize>(value: &T) -> TxResult<Vec<u8>> {
    encode(value).map_err(ConflictableTransactionError::Abort)
}

fn tx_decode<T: DeserializeOwned>(bytes: &[u8]) -> TxResult<T> {
    decode(bytes).map_err(ConflictableTransactionError::Abort)
}

fn abort<T>(err: StoreError) -> TxResult<T> {
    Err(ConflictableTransactionError::Abort(err))
}
