//! In-memory domain objects tracked for synchronization.
//!
//! An [`Entity`] is a bag of declared fields plus relationship slots, tied
//! to the [`ResourceDescriptor`] of its type and carrying a
//! [`DirtyState`]. Mutation goes through [`Entity::set`] and
//! [`Entity::set_relation`], which mark the touched field dirty; hydration
//! from a response goes through [`Entity::hydrate`], which never does.
//! The engine only writes to the network what the dirty state says has
//! changed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::sync::descriptor::ResourceDescriptor;
use crate::sync::dirty::DirtyState;
use crate::sync::errors::SyncError;

/// A relationship slot on an entity: a single child or an ordered sequence.
#[derive(Debug, Clone)]
pub enum Relation {
    /// A single related entity.
    One(Entity),
    /// An ordered sequence of related entities.
    Many(Vec<Entity>),
}

/// A local domain object mirrored against a remote resource.
///
/// Identity is carried by the remote-assigned GUID stored under the
/// descriptor's GUID field; an entity without one has never been persisted.
#[derive(Debug, Clone)]
pub struct Entity {
    descriptor: Arc<ResourceDescriptor>,
    fields: Map<String, Value>,
    relations: BTreeMap<String, Relation>,
    dirty: DirtyState,
}

impl Entity {
    /// Creates a clean, empty entity of the descriptor's type.
    #[must_use]
    pub fn new(descriptor: Arc<ResourceDescriptor>) -> Self {
        Self {
            descriptor,
            fields: Map::new(),
            relations: BTreeMap::new(),
            dirty: DirtyState::new(),
        }
    }

    /// Returns the descriptor for this entity's type.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    /// Returns the type tag of this entity.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.descriptor.name
    }

    /// Returns the remote-assigned GUID, if the entity has been persisted
    /// or hydrated. Empty strings count as absent.
    #[must_use]
    pub fn guid(&self) -> Option<&str> {
        self.fields
            .get(&self.descriptor.guid_property)
            .and_then(Value::as_str)
            .filter(|guid| !guid.is_empty())
    }

    /// Returns the value of a field, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field value and marks it dirty.
    ///
    /// Any name is accepted and stored, but only fields declared on the
    /// descriptor (and the GUID field) are ever transmitted or hydrated.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        self.dirty.mark(&name);
        self.fields.insert(name, value.into());
    }

    /// Returns a relationship slot, if set.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Sets a relationship slot and marks it dirty.
    pub fn set_relation(&mut self, name: impl Into<String>, relation: Relation) {
        let name = name.into();
        self.dirty.mark(&name);
        self.relations.insert(name, relation);
    }

    /// Removes and returns a relationship slot.
    ///
    /// Used by the engine to work on a relationship without holding a
    /// borrow of the parent; pair with [`Entity::put_relation`].
    pub fn take_relation(&mut self, name: &str) -> Option<Relation> {
        self.relations.remove(name)
    }

    /// Restores a relationship slot without touching dirty state.
    pub fn put_relation(&mut self, name: impl Into<String>, relation: Relation) {
        self.relations.insert(name.into(), relation);
    }

    /// Returns `true` if the entity has unsynchronized changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    /// Returns the dirty-state tracker.
    #[must_use]
    pub const fn dirty_state(&self) -> &DirtyState {
        &self.dirty
    }

    /// Clears all dirty flags. Called after a successful round-trip.
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    /// Clears the dirty flag for a single field.
    pub fn mark_field_clean(&mut self, name: &str) {
        self.dirty.clear_field(name);
    }

    /// Folds a response element into the entity without marking anything
    /// dirty.
    ///
    /// Only fields the descriptor declares (including the GUID field) are
    /// taken from the element. With `replace` set, server values overwrite
    /// existing local values; otherwise only absent fields are filled in.
    pub fn hydrate(&mut self, element: &Map<String, Value>, replace: bool) {
        for (key, value) in element {
            if !self.descriptor.declares(key) {
                continue;
            }
            if replace || !self.fields.contains_key(key) {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Verifies every mandatory field has a value.
    ///
    /// A mandatory field is satisfied by a non-null field value or a set
    /// relationship slot of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] listing the absent fields.
    pub fn validate(&self) -> Result<(), SyncError> {
        let missing: Vec<String> = self
            .descriptor
            .properties()
            .iter()
            .filter(|meta| meta.mandatory && !self.has_value(&meta.name))
            .map(|meta| meta.name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Validation {
                resource: self.kind().to_string(),
                missing,
            })
        }
    }

    fn has_value(&self, name: &str) -> bool {
        self.relations.contains_key(name)
            || self.fields.get(name).is_some_and(|v| !v.is_null())
    }

    /// Builds the wire payload for this entity.
    ///
    /// Fields follow the descriptor's declaration order. Properties marked
    /// save-directly are excluded; they are persisted through their own
    /// sub-resource endpoints. The GUID is always included when present so
    /// the remote side can match the record. With `dirty_only` set, clean
    /// fields are omitted.
    #[must_use]
    pub fn to_payload(&self, dirty_only: bool) -> Map<String, Value> {
        let mut payload = Map::new();

        if let Some(guid) = self.guid() {
            payload.insert(
                self.descriptor.guid_property.clone(),
                Value::String(guid.to_string()),
            );
        }

        for meta in self.descriptor.properties() {
            if meta.save_directly {
                continue;
            }
            if dirty_only && !self.dirty.is_field_dirty(&meta.name) {
                continue;
            }
            if let Some(relation) = self.relations.get(&meta.name) {
                payload.insert(meta.name.clone(), render_relation(relation));
            } else if let Some(value) = self.fields.get(&meta.name) {
                if !value.is_null() {
                    payload.insert(meta.name.clone(), value.clone());
                }
            }
        }

        payload
    }
}

fn render_relation(relation: &Relation) -> Value {
    match relation {
        Relation::One(child) => Value::Object(child.to_payload(false)),
        Relation::Many(children) => Value::Array(
            children
                .iter()
                .map(|child| Value::Object(child.to_payload(false)))
                .collect(),
        ),
    }
}
