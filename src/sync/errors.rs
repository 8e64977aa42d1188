//! Errors surfaced by synchronization operations.

use thiserror::Error;

use crate::clients::{HttpError, HttpMethod};

/// Errors that can occur while synchronizing entities with the remote API.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No descriptor is registered for the requested resource type.
    #[error("Unknown resource type: {kind}")]
    UnknownResource {
        /// The unrecognized type tag.
        kind: String,
    },

    /// The remote API does not support the verb for this resource type.
    #[error("{resource} does not support {method}")]
    UnsupportedMethod {
        /// The resource type tag.
        resource: String,
        /// The unsupported verb.
        method: HttpMethod,
    },

    /// A batch save was attempted with no entities.
    #[error("Batch save requires at least one entity")]
    EmptyBatch,

    /// A batch save mixed entities of different resource types.
    #[error("Batch save requires homogeneous entities: expected {expected}, found {found}")]
    HeterogeneousBatch {
        /// The type tag of the first entity in the batch.
        expected: String,
        /// The first differing type tag encountered.
        found: String,
    },

    /// The operation requires a remote-assigned GUID the entity lacks.
    #[error("{resource} has no GUID; save it before this operation")]
    MissingGuid {
        /// The resource type tag.
        resource: String,
    },

    /// Pre-save validation found mandatory fields with no value.
    #[error("{resource} is missing mandatory fields: {}", missing.join(", "))]
    Validation {
        /// The resource type tag.
        resource: String,
        /// The names of the absent mandatory fields.
        missing: Vec<String>,
    },

    /// The underlying HTTP exchange failed.
    #[error(transparent)]
    Http(#[from] HttpError),
}

// Verify SyncError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SyncError>();
};
