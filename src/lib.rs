//! # Ledger Sync
//!
//! A synchronization engine that reconciles local in-memory accounting
//! entities (invoices, contacts, line items) with a remote
//! resource-oriented API. Given a mutated object graph, the engine
//! decides what must be sent over the wire, in which shape (markup or
//! JSON, per resource type), via which HTTP verb, and how to fold a
//! possibly partial response back into the local objects.
//!
//! ## Features
//!
//! - **Dirty-state-driven persistence**: only changed fields travel, and
//!   a clean entity round-trips with zero network writes
//! - **Per-type verb selection**: the remote API overloads verbs per
//!   resource type; descriptors carry the supported set and the engine
//!   picks create vs update verbs accordingly
//! - **Batch saves with partial failure**: one request per batch, with
//!   per-index error detail and positional folding
//! - **Save-directly relationships**: child collections persisted through
//!   their own sub-resource endpoints
//! - **GUID-keyed retrieval** and filtered listing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledger_sync::{
//!     AccessToken, ApiBaseUrl, ApiStem, DescriptorRegistry, HttpMethod,
//!     PropertyMeta, ResourceDescriptor, SyncConfig, SyncEngine,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::builder()
//!     .base_url(ApiBaseUrl::new("https://api.xero.com")?)
//!     .access_token(AccessToken::new("access-token")?)
//!     .build()?;
//!
//! let registry = DescriptorRegistry::new().register(
//!     ResourceDescriptor::new("Contact", "Contacts", ApiStem::Core)
//!         .root_node("Contact")
//!         .guid_property("ContactID")
//!         .methods([HttpMethod::Get, HttpMethod::Post, HttpMethod::Put])
//!         .property(PropertyMeta::new("Name").mandatory())
//!         .property(PropertyMeta::new("EmailAddress")),
//! );
//!
//! let engine = SyncEngine::new(&config, registry);
//!
//! let mut contact = engine.new_entity("Contact")?;
//! contact.set("Name", "Acme Ltd");
//! engine.save(&mut contact, true).await?;
//!
//! assert!(contact.guid().is_some());
//! assert!(!contact.is_dirty());
//! # Ok(())
//! # }
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod sync;

pub use clients::{
    DataType, HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError,
};
pub use config::{AccessToken, ApiBaseUrl, SyncConfig, SyncConfigBuilder};
pub use error::ConfigError;
pub use sync::{
    ApiStem, DescriptorRegistry, DirtyState, ElementError, Entity, PropertyMeta, Query, Relation,
    ResourceDescriptor, SyncEngine, SyncError, SyncResponse,
};
