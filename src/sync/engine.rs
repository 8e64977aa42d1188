//! The synchronization engine.
//!
//! [`SyncEngine`] orchestrates everything between a local entity graph and
//! the remote API: verb selection, body encoding, save-directly
//! relationship persistence, batch homogeneity checks, partial-failure
//! folding, and GUID-keyed retrieval. It issues at most one request at a
//! time and never retries; transport failures are terminal for the call
//! that triggered them.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = SyncEngine::new(&config, registry);
//!
//! let mut contact = engine.new_entity("Contact")?;
//! contact.set("Name", "Acme Ltd");
//! let response = engine.save(&mut contact, true).await?;
//!
//! assert!(contact.guid().is_some());
//! assert!(!contact.is_dirty());
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::{DataType, HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::config::SyncConfig;
use crate::sync::descriptor::{DescriptorRegistry, ResourceDescriptor};
use crate::sync::entity::{Entity, Relation};
use crate::sync::errors::SyncError;
use crate::sync::query::Query;
use crate::sync::response::SyncResponse;
use crate::sync::xml;

/// Synchronizes local entities with the remote resource-oriented API.
///
/// The engine holds the transport and the descriptor registry; entities
/// are passed in and out of its methods by the caller. No internal locking
/// exists, so callers must not mutate an entity while one of its saves is
/// in flight.
#[derive(Debug)]
pub struct SyncEngine {
    http: HttpClient,
    registry: DescriptorRegistry,
}

impl SyncEngine {
    /// Creates an engine from configuration and a resolved registry.
    #[must_use]
    pub fn new(config: &SyncConfig, registry: DescriptorRegistry) -> Self {
        Self {
            http: HttpClient::new(config),
            registry,
        }
    }

    /// Returns the descriptor registry.
    #[must_use]
    pub const fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    pub(crate) const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Constructs a fresh, clean entity of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownResource`] for an unregistered type tag.
    pub fn new_entity(&self, kind: &str) -> Result<Entity, SyncError> {
        self.registry.new_entity(kind)
    }

    /// Persists an entity's pending changes.
    ///
    /// Dirty save-directly relationship properties are persisted first
    /// through their own endpoints, unconditionally. If the entity itself
    /// is then still clean, no further request is made and `None` is
    /// returned. Otherwise the entity is validated and saved: an entity
    /// with a GUID updates at `{resourcePath}/{guid}` (POST if supported,
    /// else PUT); one without creates at `{resourcePath}` with the
    /// descriptor's preferred create verb (else PUT if supported, else
    /// POST). On success the first response element is folded back into
    /// the entity (`replace_data` controls overwrite-vs-fill semantics)
    /// and the entity is marked clean.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] before any request if mandatory
    /// fields are absent, [`SyncError::UnsupportedMethod`] if the selected
    /// verb is not supported, and [`SyncError::Http`] for transport
    /// failures.
    pub async fn save(
        &self,
        entity: &mut Entity,
        replace_data: bool,
    ) -> Result<Option<SyncResponse>, SyncError> {
        // Relationship properties carry their own dirty flags; they are
        // persisted even when the entity itself is clean.
        self.save_relationships(entity).await?;

        if !entity.is_dirty() {
            tracing::debug!(kind = entity.kind(), "entity clean, skipping save");
            return Ok(None);
        }

        entity.validate()?;

        let descriptor = Arc::clone(entity.descriptor());
        let (method, path) = match entity.guid() {
            Some(guid) => (
                update_method(&descriptor),
                format!("{}/{}", descriptor.endpoint(), guid),
            ),
            None => (descriptor.create_method_or_inferred(), descriptor.endpoint()),
        };

        if !descriptor.supports(method) {
            return Err(SyncError::UnsupportedMethod {
                resource: descriptor.name.clone(),
                method,
            });
        }

        tracing::debug!(kind = entity.kind(), %method, %path, "saving entity");

        let payload = entity.to_payload(true);
        let request = encode_request(method, path, &descriptor, &payload)?;
        let response = self.http.request(request).await?;
        let decoded = SyncResponse::from_http(&response, &descriptor);

        if let Some(element) = decoded.element(0) {
            entity.hydrate(element, replace_data);
        }
        entity.mark_clean();

        Ok(Some(decoded))
    }

    /// Persists a homogeneous batch of entities in one request.
    ///
    /// The batch uses POST (bulk update) if any entity already has a GUID,
    /// otherwise PUT (bulk create); passing `check_guid = false` forces
    /// the update treatment regardless of entity state. Bodies are always
    /// encoded as a markup batch under the pluralized root node, and the
    /// server is asked not to summarize errors so per-index detail comes
    /// back. Entities whose response index carries no error are folded and
    /// marked clean; errored indices are left dirty and untouched, and the
    /// returned response is the only channel for discovering them.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::EmptyBatch`] or
    /// [`SyncError::HeterogeneousBatch`] before any request for a
    /// malformed batch, [`SyncError::Validation`] if any entity fails
    /// pre-save validation, and [`SyncError::Http`] for transport
    /// failures.
    pub async fn save_all(
        &self,
        entities: &mut [Entity],
        check_guid: bool,
    ) -> Result<SyncResponse, SyncError> {
        let first = entities.first().ok_or(SyncError::EmptyBatch)?;
        let descriptor = Arc::clone(first.descriptor());

        for entity in entities.iter() {
            if entity.kind() != descriptor.name {
                return Err(SyncError::HeterogeneousBatch {
                    expected: descriptor.name.clone(),
                    found: entity.kind().to_string(),
                });
            }
            entity.validate()?;
        }

        let has_guid = !check_guid || entities.iter().any(|entity| entity.guid().is_some());
        let method = if has_guid {
            HttpMethod::Post
        } else {
            HttpMethod::Put
        };

        if !descriptor.supports(method) {
            return Err(SyncError::UnsupportedMethod {
                resource: descriptor.name.clone(),
                method,
            });
        }

        tracing::debug!(
            kind = %descriptor.name,
            count = entities.len(),
            %method,
            "saving batch"
        );

        let items: Vec<Map<String, Value>> = entities
            .iter()
            .map(|entity| entity.to_payload(true))
            .collect();
        let body = xml::encode_collection(&xml::pluralize(&descriptor.root_node), &items);

        let request = HttpRequest::builder(method, descriptor.endpoint())
            .body(body)
            .body_type(DataType::Xml)
            .query_param("SummarizeErrors", "false")
            .build()
            .map_err(HttpError::from)?;
        let response = self.http.request(request).await?;
        let decoded = SyncResponse::from_http(&response, &descriptor);

        if decoded.has_errors() {
            tracing::warn!(
                kind = %descriptor.name,
                errored = decoded.errors().len(),
                "batch save returned element errors"
            );
        }

        for (index, entity) in entities.iter_mut().enumerate() {
            if !decoded.is_element_ok(index) {
                continue;
            }
            if let Some(element) = decoded.element(index) {
                entity.hydrate(element, true);
            }
            entity.mark_clean();
        }

        Ok(decoded)
    }

    /// Persists every dirty save-directly relationship property through
    /// its sub-resource endpoint, independent of the parent's own dirty
    /// flag.
    ///
    /// Each processed property is marked clean on the parent even when
    /// some of its items failed; the returned responses carry the
    /// per-index errors so callers can detect partial failure.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingGuid`] if a dirty relationship exists
    /// on a parent that has never been persisted, and [`SyncError::Http`]
    /// for transport failures. On error the property keeps its dirty flag.
    pub async fn save_relationships(
        &self,
        entity: &mut Entity,
    ) -> Result<Vec<SyncResponse>, SyncError> {
        let descriptor = Arc::clone(entity.descriptor());
        let mut responses = Vec::new();

        let direct_properties: Vec<String> = descriptor
            .properties()
            .iter()
            .filter(|meta| meta.save_directly)
            .map(|meta| meta.name.clone())
            .collect();

        for name in direct_properties {
            if !entity.dirty_state().is_field_dirty(&name) {
                continue;
            }
            let Some(mut relation) = entity.take_relation(&name) else {
                // Dirty flag without a slot value: nothing to send.
                entity.mark_field_clean(&name);
                continue;
            };

            let Some(parent_guid) = entity.guid().map(str::to_string) else {
                entity.put_relation(&name, relation);
                return Err(SyncError::MissingGuid {
                    resource: descriptor.name.clone(),
                });
            };

            let result = self
                .persist_relation(&descriptor, &parent_guid, &mut relation, &mut responses)
                .await;
            entity.put_relation(&name, relation);
            result?;

            // Cleared even on per-element failure; the responses carry
            // the error detail.
            entity.mark_field_clean(&name);
        }

        Ok(responses)
    }

    async fn persist_relation(
        &self,
        parent: &ResourceDescriptor,
        parent_guid: &str,
        relation: &mut Relation,
        responses: &mut Vec<SyncResponse>,
    ) -> Result<(), SyncError> {
        match relation {
            Relation::One(child) => {
                let child_descriptor = Arc::clone(child.descriptor());
                // A single child is addressed through the child type's API
                // segment.
                let path = format!(
                    "{}/{}/{}/{}",
                    child_descriptor.api_stem.path(),
                    parent.resource_path,
                    parent_guid,
                    child_descriptor.resource_path,
                );
                let method = child_descriptor.create_method_or_inferred();

                let decoded = self
                    .send_json(method, path, &child.to_payload(false), &child_descriptor)
                    .await?;
                if let Some(element) = decoded.element(0) {
                    fold_declared_fields(child, element);
                }
                responses.push(decoded);
            }
            Relation::Many(children) => {
                let Some(first) = children.first() else {
                    return Ok(());
                };
                let child_descriptor = Arc::clone(first.descriptor());
                // A sequence is addressed through the parent's API segment.
                let path = format!(
                    "{}/{}/{}",
                    parent.endpoint(),
                    parent_guid,
                    child_descriptor.resource_path,
                );
                let method = child_descriptor.create_method_or_inferred();

                if !child_descriptor.root_node.is_empty() {
                    // Wrapped child types batch in one markup request.
                    let items: Vec<Map<String, Value>> = children
                        .iter()
                        .map(|child| child.to_payload(false))
                        .collect();
                    let body = xml::encode_collection(
                        &xml::pluralize(&child_descriptor.root_node),
                        &items,
                    );
                    let request = HttpRequest::builder(method, path)
                        .body(body)
                        .body_type(DataType::Xml)
                        .query_param("SummarizeErrors", "false")
                        .build()
                        .map_err(HttpError::from)?;
                    let response = self.http.request(request).await?;
                    let decoded = SyncResponse::from_http(&response, &child_descriptor);

                    if decoded.has_errors() {
                        tracing::warn!(
                            kind = %child_descriptor.name,
                            errored = decoded.errors().len(),
                            "relationship batch returned element errors"
                        );
                    }

                    for (index, child) in children.iter_mut().enumerate() {
                        if !decoded.is_element_ok(index) {
                            continue;
                        }
                        if let Some(element) = decoded.element(index) {
                            child.hydrate(element, true);
                        }
                        child.mark_clean();
                    }
                    responses.push(decoded);
                } else {
                    // Flat JSON children have no batch form; each item is
                    // its own request.
                    for child in children.iter_mut() {
                        let decoded = self
                            .send_json(
                                method,
                                path.clone(),
                                &child.to_payload(false),
                                &child_descriptor,
                            )
                            .await?;
                        if decoded.is_element_ok(0) {
                            if let Some(element) = decoded.element(0) {
                                child.hydrate(element, true);
                            }
                            child.mark_clean();
                        }
                        responses.push(decoded);
                    }
                }
            }
        }
        Ok(())
    }

    async fn send_json(
        &self,
        method: HttpMethod,
        path: String,
        payload: &Map<String, Value>,
        descriptor: &ResourceDescriptor,
    ) -> Result<SyncResponse, SyncError> {
        let request = HttpRequest::builder(method, path)
            .body(Value::Object(payload.clone()).to_string())
            .body_type(DataType::Json)
            .build()
            .map_err(HttpError::from)?;
        let response = self.http.request(request).await?;
        Ok(SyncResponse::from_http(&response, descriptor))
    }

    /// Retrieves a single entity by its remote GUID.
    ///
    /// Returns `None` when the response is empty but successful; a remote
    /// not-found surfaces as [`SyncError::Http`] from the transport before
    /// this distinction applies.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownResource`] for an unregistered type tag
    /// and [`SyncError::Http`] for transport failures.
    pub async fn load_by_guid(
        &self,
        kind: &str,
        guid: &str,
    ) -> Result<Option<Entity>, SyncError> {
        let descriptor = self.registry.descriptor(kind)?;
        let path = format!("{}/{}", descriptor.endpoint(), guid);

        let request = HttpRequest::builder(HttpMethod::Get, path)
            .build()
            .map_err(HttpError::from)?;
        let response = self.http.request(request).await?;
        let decoded = SyncResponse::from_http(&response, &descriptor);

        Ok(decoded.element(0).map(|element| {
            let mut entity = Entity::new(Arc::clone(&descriptor));
            entity.hydrate(element, true);
            entity
        }))
    }

    /// Retrieves several entities by GUID in one request, using the
    /// comma-separated `IDs` filter parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownResource`] for an unregistered type tag
    /// and [`SyncError::Http`] for transport failures.
    pub async fn load_by_guids(
        &self,
        kind: &str,
        guids: &[&str],
    ) -> Result<Vec<Entity>, SyncError> {
        let descriptor = self.registry.descriptor(kind)?;

        let request = HttpRequest::builder(HttpMethod::Get, descriptor.endpoint())
            .query_param("IDs", guids.join(","))
            .build()
            .map_err(HttpError::from)?;
        let response = self.http.request(request).await?;
        let decoded = SyncResponse::from_http(&response, &descriptor);

        Ok(decoded
            .elements()
            .iter()
            .map(|element| {
                let mut entity = Entity::new(Arc::clone(&descriptor));
                entity.hydrate(element, true);
                entity
            })
            .collect())
    }

    /// Deletes an entity's remote counterpart.
    ///
    /// Some resource types answer a delete with a post-delete
    /// representation; when an element comes back it is force-folded into
    /// the entity so the local object reflects the remote state.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnsupportedMethod`] without sending anything
    /// if the type does not support DELETE, [`SyncError::MissingGuid`] if
    /// the entity was never persisted, and [`SyncError::Http`] for
    /// transport failures.
    pub async fn delete(&self, entity: &mut Entity) -> Result<SyncResponse, SyncError> {
        let descriptor = Arc::clone(entity.descriptor());

        if !descriptor.supports(HttpMethod::Delete) {
            return Err(SyncError::UnsupportedMethod {
                resource: descriptor.name.clone(),
                method: HttpMethod::Delete,
            });
        }
        let Some(guid) = entity.guid().map(str::to_string) else {
            return Err(SyncError::MissingGuid {
                resource: descriptor.name.clone(),
            });
        };

        tracing::debug!(kind = entity.kind(), %guid, "deleting entity");

        let path = format!("{}/{}", descriptor.endpoint(), guid);
        let request = HttpRequest::builder(HttpMethod::Delete, path)
            .build()
            .map_err(HttpError::from)?;
        let response = self.http.request(request).await?;
        let decoded = SyncResponse::from_http(&response, &descriptor);

        if let Some(element) = decoded.element(0) {
            entity.hydrate(element, true);
        }

        Ok(decoded)
    }

    /// Starts a filtered listing query for the given type.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownResource`] for an unregistered type tag.
    pub fn load(&self, kind: &str) -> Result<Query<'_>, SyncError> {
        let descriptor = self.registry.descriptor(kind)?;
        Ok(Query::new(self, descriptor))
    }
}

/// Update saves prefer POST, falling back to PUT. The inverse of create
/// inference; the remote API overloads verbs per resource type.
fn update_method(descriptor: &ResourceDescriptor) -> HttpMethod {
    if descriptor.supports(HttpMethod::Post) {
        HttpMethod::Post
    } else {
        HttpMethod::Put
    }
}

fn encode_request(
    method: HttpMethod,
    path: String,
    descriptor: &ResourceDescriptor,
    payload: &Map<String, Value>,
) -> Result<HttpRequest, SyncError> {
    let (body, body_type) = if descriptor.root_node.is_empty() {
        (Value::Object(payload.clone()).to_string(), DataType::Json)
    } else {
        (xml::encode(&descriptor.root_node, payload), DataType::Xml)
    };

    HttpRequest::builder(method, path)
        .body(body)
        .body_type(body_type)
        .build()
        .map_err(|error| SyncError::Http(HttpError::from(error)))
}

/// Folds a response element into a child entity, clearing the dirty flag
/// of exactly the declared fields the element carried.
fn fold_declared_fields(child: &mut Entity, element: &Map<String, Value>) {
    let folded: Vec<String> = element
        .keys()
        .filter(|key| child.descriptor().declares(key))
        .cloned()
        .collect();
    child.hydrate(element, true);
    for key in &folded {
        child.mark_field_clean(key);
    }
}
