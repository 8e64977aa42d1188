//! Object-to-resource synchronization.
//!
//! This module is the heart of the crate: it decides what must be sent
//! over the wire for a mutated entity graph, in which shape (markup or
//! JSON), via which verb, and how to fold a possibly partial response
//! back into local objects without discarding unrelated state.
//!
//! - [`descriptor`] holds the per-type configuration table
//! - [`entity`] holds the tracked domain objects and their dirty state
//! - [`engine`] orchestrates saves, batch saves, deletes, and retrieval
//! - [`response`] decodes responses and per-element validation errors
//! - [`query`] provides filtered listing
//! - [`xml`] encodes markup bodies for wrapped resource types

pub mod descriptor;
pub mod dirty;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod query;
pub mod response;
pub mod xml;

pub use descriptor::{ApiStem, DescriptorRegistry, PropertyMeta, ResourceDescriptor};
pub use dirty::DirtyState;
pub use engine::SyncEngine;
pub use entity::{Entity, Relation};
pub use errors::SyncError;
pub use query::Query;
pub use response::{ElementError, SyncResponse};
