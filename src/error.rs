//! Error types for plugin execution.
//!
//! Errors are classified by how the pipeline host treats them:
//! - Reported: surfaced through output parameters, the transaction continues
//!   (e.g. a missing Target parameter, see `qualify_plugin`)
//! - Unrecoverable: propagated out of the plugin, aborting the pipeline
//!   transaction and rolling back any writes made inside it

use thiserror::Error;

use crate::service::ServiceError;

pub type PluginResult<T> = Result<T, PluginError>;

/// Error raised out of a plugin action. Anything that reaches the pipeline
/// host as an `Err` aborts the transaction.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A data-service round trip failed.
    #[error("Data service error: {0}")]
    Service(#[from] ServiceError),

    /// The invocation context did not carry what the plugin was registered
    /// for (wrong parameter shape, missing image).
    #[error("Invalid plugin invocation: {0}")]
    InvalidInvocation(String),

    /// A business-level failure that must abort the transaction. The message
    /// is surfaced to the caller by the host.
    #[error("{0}")]
    Unrecoverable(String),
}
