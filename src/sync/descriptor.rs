//! Per-resource-type static metadata.
//!
//! A [`ResourceDescriptor`] captures everything the engine must know about
//! a remote resource type: its path, API segment, wrapping node name,
//! supported verbs, and property metadata. Descriptors are immutable,
//! resolved once at startup through a [`DescriptorRegistry`], and shared by
//! every entity of that type via `Arc`.
//!
//! # Example
//!
//! ```rust
//! use ledger_sync::sync::{ApiStem, DescriptorRegistry, PropertyMeta, ResourceDescriptor};
//! use ledger_sync::HttpMethod;
//!
//! let contact = ResourceDescriptor::new("Contact", "Contacts", ApiStem::Core)
//!     .root_node("Contact")
//!     .guid_property("ContactID")
//!     .methods([HttpMethod::Get, HttpMethod::Post, HttpMethod::Put])
//!     .property(PropertyMeta::new("Name").mandatory())
//!     .property(PropertyMeta::new("EmailAddress"));
//!
//! let registry = DescriptorRegistry::new().register(contact);
//! let descriptor = registry.descriptor("Contact").unwrap();
//! assert!(descriptor.supports(HttpMethod::Post));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::clients::HttpMethod;
use crate::sync::entity::Entity;
use crate::sync::errors::SyncError;

/// The API segment a resource type lives under.
///
/// Each segment carries its own version stem; the full request path is
/// `{stem}/{resource_path}[/...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiStem {
    /// The core accounting API (`api.xro/2.0`).
    Core,
    /// The payroll API (`payroll.xro/2.0`).
    Payroll,
    /// The files API (`files.xro/1.0`).
    Files,
    /// The fixed-assets API (`assets.xro/1.0`).
    Assets,
}

impl ApiStem {
    /// Returns the path stem for this API segment, including its version.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Core => "api.xro/2.0",
            Self::Payroll => "payroll.xro/2.0",
            Self::Files => "files.xro/1.0",
            Self::Assets => "assets.xro/1.0",
        }
    }
}

/// Metadata for a single declared property of a resource type.
///
/// The ordered property list on a descriptor doubles as the explicit
/// field-name mapping used when folding response elements back into an
/// entity: only declared names are ever set, so no runtime reflection is
/// needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMeta {
    /// The property name as it appears on the wire (e.g., `Name`).
    pub name: String,
    /// Whether the property must be present before a save is attempted.
    pub mandatory: bool,
    /// Whether the property is persisted through its own sub-resource
    /// endpoint rather than inline with the parent payload.
    pub save_directly: bool,
}

impl PropertyMeta {
    /// Creates metadata for a plain optional property.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mandatory: false,
            save_directly: false,
        }
    }

    /// Marks the property as mandatory for pre-save validation.
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Marks the property as persisted through its own sub-resource
    /// endpoint.
    #[must_use]
    pub const fn save_directly(mut self) -> Self {
        self.save_directly = true;
        self
    }
}

/// Static metadata for one remote resource type.
///
/// Immutable for the lifetime of the process and shared by all entities of
/// the type. Construct with [`ResourceDescriptor::new`] and the chaining
/// setters, then hand to a [`DescriptorRegistry`].
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// The type tag (e.g., `Contact`), used for registry lookup and batch
    /// homogeneity checks.
    pub name: String,
    /// The resource path segment (e.g., `Contacts`).
    pub resource_path: String,
    /// The API segment this type lives under.
    pub api_stem: ApiStem,
    /// The wrapping node name for markup serialization. Empty string means
    /// the resource is an unwrapped plain-JSON payload.
    pub root_node: String,
    /// The field name carrying the remote-assigned GUID (e.g., `ContactID`).
    pub guid_property: String,
    /// The preferred verb for creating new instances. `None` means "infer
    /// from the supported verb set".
    pub create_method: Option<HttpMethod>,
    supported_methods: HashSet<HttpMethod>,
    properties: Vec<PropertyMeta>,
}

impl ResourceDescriptor {
    /// Creates a descriptor with no root node, no declared properties, and
    /// GET as the only supported verb.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        resource_path: impl Into<String>,
        api_stem: ApiStem,
    ) -> Self {
        let mut supported_methods = HashSet::new();
        supported_methods.insert(HttpMethod::Get);

        Self {
            name: name.into(),
            resource_path: resource_path.into(),
            api_stem,
            root_node: String::new(),
            guid_property: String::new(),
            create_method: None,
            supported_methods,
            properties: Vec::new(),
        }
    }

    /// Sets the wrapping root node name used for markup serialization.
    #[must_use]
    pub fn root_node(mut self, root_node: impl Into<String>) -> Self {
        self.root_node = root_node.into();
        self
    }

    /// Sets the field name that carries the remote-assigned GUID.
    #[must_use]
    pub fn guid_property(mut self, guid_property: impl Into<String>) -> Self {
        self.guid_property = guid_property.into();
        self
    }

    /// Replaces the supported verb set.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.supported_methods = methods.into_iter().collect();
        self
    }

    /// Sets the preferred create verb.
    #[must_use]
    pub const fn create_with(mut self, method: HttpMethod) -> Self {
        self.create_method = Some(method);
        self
    }

    /// Appends a declared property. Order is preserved and significant for
    /// payload building.
    #[must_use]
    pub fn property(mut self, property: PropertyMeta) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns `true` if the remote API supports the verb for this type.
    #[must_use]
    pub fn supports(&self, method: HttpMethod) -> bool {
        self.supported_methods.contains(&method)
    }

    /// Returns the verb used to create new instances: the preferred create
    /// verb when declared, otherwise PUT if supported, else POST.
    #[must_use]
    pub fn create_method_or_inferred(&self) -> HttpMethod {
        self.create_method.unwrap_or(if self.supports(HttpMethod::Put) {
            HttpMethod::Put
        } else {
            HttpMethod::Post
        })
    }

    /// Returns the declared property metadata, in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyMeta] {
        &self.properties
    }

    /// Looks up a declared property by name.
    #[must_use]
    pub fn property_meta(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns `true` if the name is a declared property or the GUID field.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        name == self.guid_property || self.property_meta(name).is_some()
    }

    /// Returns the request path for this type's collection endpoint:
    /// `{stem}/{resource_path}`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.api_stem.path(), self.resource_path)
    }
}

/// A registry of immutable resource descriptors, resolved at startup.
///
/// The registry is the per-type configuration table the engine consults in
/// place of runtime type inspection: every entity carries an `Arc` handle
/// to its descriptor, and retrieval operations look types up by tag.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, Arc<ResourceDescriptor>>,
}

impl DescriptorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its type tag, replacing any previous
    /// registration for the same tag.
    #[must_use]
    pub fn register(mut self, descriptor: ResourceDescriptor) -> Self {
        self.descriptors
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        self
    }

    /// Resolves a descriptor by type tag.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownResource`] if no descriptor was
    /// registered under the tag.
    pub fn descriptor(&self, kind: &str) -> Result<Arc<ResourceDescriptor>, SyncError> {
        self.descriptors
            .get(kind)
            .cloned()
            .ok_or_else(|| SyncError::UnknownResource {
                kind: kind.to_string(),
            })
    }

    /// Constructs a fresh, clean entity of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownResource`] if no descriptor was
    /// registered under the tag.
    pub fn new_entity(&self, kind: &str) -> Result<Entity, SyncError> {
        Ok(Entity::new(self.descriptor(kind)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("Contact", "Contacts", ApiStem::Core)
            .root_node("Contact")
            .guid_property("ContactID")
            .methods([HttpMethod::Get, HttpMethod::Post, HttpMethod::Put])
            .property(PropertyMeta::new("Name").mandatory())
            .property(PropertyMeta::new("EmailAddress"))
    }

    #[test]
    fn test_descriptor_defaults_to_get_only() {
        let descriptor = ResourceDescriptor::new("Currency", "Currencies", ApiStem::Core);
        assert!(descriptor.supports(HttpMethod::Get));
        assert!(!descriptor.supports(HttpMethod::Post));
        assert!(descriptor.root_node.is_empty());
    }

    #[test]
    fn test_supports_reflects_declared_methods() {
        let descriptor = contact_descriptor();
        assert!(descriptor.supports(HttpMethod::Post));
        assert!(descriptor.supports(HttpMethod::Put));
        assert!(!descriptor.supports(HttpMethod::Delete));
    }

    #[test]
    fn test_create_method_inference_prefers_put() {
        let descriptor = contact_descriptor();
        assert_eq!(descriptor.create_method_or_inferred(), HttpMethod::Put);
    }

    #[test]
    fn test_create_method_inference_falls_back_to_post() {
        let descriptor = ResourceDescriptor::new("Receipt", "Receipts", ApiStem::Core)
            .methods([HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(descriptor.create_method_or_inferred(), HttpMethod::Post);
    }

    #[test]
    fn test_explicit_create_method_wins() {
        let descriptor = contact_descriptor().create_with(HttpMethod::Post);
        assert_eq!(descriptor.create_method_or_inferred(), HttpMethod::Post);
    }

    #[test]
    fn test_declares_includes_guid_property() {
        let descriptor = contact_descriptor();
        assert!(descriptor.declares("ContactID"));
        assert!(descriptor.declares("Name"));
        assert!(!descriptor.declares("Unknown"));
    }

    #[test]
    fn test_endpoint_joins_stem_and_path() {
        assert_eq!(contact_descriptor().endpoint(), "api.xro/2.0/Contacts");
    }

    #[test]
    fn test_api_stem_paths() {
        assert_eq!(ApiStem::Core.path(), "api.xro/2.0");
        assert_eq!(ApiStem::Payroll.path(), "payroll.xro/2.0");
        assert_eq!(ApiStem::Files.path(), "files.xro/1.0");
        assert_eq!(ApiStem::Assets.path(), "assets.xro/1.0");
    }

    #[test]
    fn test_registry_resolves_registered_descriptor() {
        let registry = DescriptorRegistry::new().register(contact_descriptor());
        let descriptor = registry.descriptor("Contact").unwrap();
        assert_eq!(descriptor.resource_path, "Contacts");
    }

    #[test]
    fn test_registry_rejects_unknown_kind() {
        let registry = DescriptorRegistry::new();
        assert!(matches!(
            registry.descriptor("Widget"),
            Err(SyncError::UnknownResource { kind }) if kind == "Widget"
        ));
    }

    #[test]
    fn test_registry_new_entity_starts_clean() {
        let registry = DescriptorRegistry::new().register(contact_descriptor());
        let entity = registry.new_entity("Contact").unwrap();
        assert!(!entity.is_dirty());
        assert!(entity.guid().is_none());
    }
}
