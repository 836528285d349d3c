//! Data-service abstraction over the platform's remote record API.
//!
//! Everything the plugins do against the platform flows through
//! `RecordService`: retrieve with column projection, structured queries,
//! create, update, and the state-transition request. Calls are blocking and
//! strictly sequential; timeout and retry policy belong to the host
//! transport, not to this layer.

use uuid::Uuid;

use crate::query::Query;
use crate::record::{EntityReference, Record};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Record has no id: {0}")]
    MissingId(String),
}

/// Synchronous record operations against the platform data service.
pub trait RecordService {
    /// Retrieve one record by reference, projecting `columns`.
    fn retrieve(&self, target: &EntityReference, columns: &[&str]) -> ServiceResult<Record>;

    /// Run a structured query; returns matching records in service order.
    fn retrieve_multiple(&self, query: &Query) -> ServiceResult<Vec<Record>>;

    /// Persist a new record; returns the id the service assigned.
    fn create(&self, record: &Record) -> ServiceResult<Uuid>;

    /// Write the set attributes of `record` onto the existing record
    /// identified by its id. Absent attributes are left untouched.
    fn update(&self, record: &Record) -> ServiceResult<()>;

    /// Transition a record's state/status codes (platform global option
    /// set; the codes are passed through as given).
    fn set_state(&self, target: &EntityReference, state: i32, status: i32) -> ServiceResult<()>;
}
