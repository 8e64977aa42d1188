//! Decoded synchronization responses.
//!
//! The remote API answers every request in JSON, either as a wrapped
//! collection under the pluralized root node or, for unwrapped resource
//! types, as a bare object. [`SyncResponse`] normalizes both shapes into a
//! positional element list and surfaces per-element validation errors as
//! data rather than failures: in a batch, element `i` corresponds to the
//! entity sent at index `i`.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::clients::HttpResponse;
use crate::sync::descriptor::ResourceDescriptor;
use crate::sync::xml::pluralize;

/// Validation failure reported for one element of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementError {
    /// The provider's validation messages for the element.
    pub messages: Vec<String>,
}

/// A decoded response from a synchronization request.
///
/// Elements keep the positional correspondence of the request that
/// produced them, which is what makes per-index error reporting on batch
/// saves possible.
#[derive(Debug, Clone, Default)]
pub struct SyncResponse {
    elements: Vec<Map<String, Value>>,
    errors: HashMap<usize, ElementError>,
    code: u16,
}

impl SyncResponse {
    /// Decodes an HTTP response using the resource type's wrapping rules.
    ///
    /// Wrapped types carry their elements under the pluralized root node,
    /// as either an array or a single object. Unwrapped types answer with
    /// the element itself; an empty body object decodes to zero elements.
    #[must_use]
    pub fn from_http(response: &HttpResponse, descriptor: &ResourceDescriptor) -> Self {
        let elements = extract_elements(&response.body, descriptor);
        let errors = elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| element_error(element).map(|error| (index, error)))
            .collect();

        Self {
            elements,
            errors,
            code: response.code,
        }
    }

    /// Returns the decoded elements in request order.
    #[must_use]
    pub fn elements(&self) -> &[Map<String, Value>] {
        &self.elements
    }

    /// Returns the element at the given index, if present.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Map<String, Value>> {
        self.elements.get(index)
    }

    /// Returns per-index validation errors keyed by element position.
    #[must_use]
    pub const fn errors(&self) -> &HashMap<usize, ElementError> {
        &self.errors
    }

    /// Returns the validation error for one element, if it has one.
    #[must_use]
    pub fn error_at(&self, index: usize) -> Option<&ElementError> {
        self.errors.get(&index)
    }

    /// Returns `true` if the element at the index decoded without a
    /// validation error.
    #[must_use]
    pub fn is_element_ok(&self, index: usize) -> bool {
        index < self.elements.len() && !self.errors.contains_key(&index)
    }

    /// Returns `true` if any element carries a validation error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the HTTP status code of the underlying response.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }
}

fn extract_elements(body: &Value, descriptor: &ResourceDescriptor) -> Vec<Map<String, Value>> {
    if descriptor.root_node.is_empty() {
        // Unwrapped types answer with the element itself.
        return match body.as_object() {
            Some(object) if !object.is_empty() => vec![object.clone()],
            _ => Vec::new(),
        };
    }

    match body.get(pluralize(&descriptor.root_node)) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .cloned()
            .collect(),
        Some(Value::Object(object)) => vec![object.clone()],
        _ => Vec::new(),
    }
}

fn element_error(element: &Map<String, Value>) -> Option<ElementError> {
    let flagged = element
        .get("StatusAttributeString")
        .and_then(Value::as_str)
        .is_some_and(|status| status.eq_ignore_ascii_case("ERROR"));

    let messages: Vec<String> = element
        .get("ValidationErrors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|error| error.get("Message"))
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if flagged || !messages.is_empty() {
        Some(ElementError { messages })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use crate::sync::descriptor::{ApiStem, PropertyMeta};
    use serde_json::json;

    fn contact_descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("Contact", "Contacts", ApiStem::Core)
            .root_node("Contact")
            .guid_property("ContactID")
            .methods([HttpMethod::Get, HttpMethod::Post, HttpMethod::Put])
            .property(PropertyMeta::new("Name").mandatory())
    }

    fn attachment_descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("FileObject", "Files", ApiStem::Files)
            .guid_property("Id")
            .methods([HttpMethod::Get, HttpMethod::Post])
    }

    fn http(body: Value) -> HttpResponse {
        HttpResponse::new(200, HashMap::new(), body)
    }

    #[test]
    fn test_wrapped_array_decodes_positionally() {
        let response = SyncResponse::from_http(
            &http(json!({"Contacts": [
                {"ContactID": "a", "Name": "One"},
                {"ContactID": "b", "Name": "Two"},
            ]})),
            &contact_descriptor(),
        );

        assert_eq!(response.elements().len(), 2);
        assert_eq!(response.element(0).unwrap()["Name"], json!("One"));
        assert_eq!(response.element(1).unwrap()["ContactID"], json!("b"));
    }

    #[test]
    fn test_wrapped_single_object_decodes_to_one_element() {
        let response = SyncResponse::from_http(
            &http(json!({"Contacts": {"ContactID": "a", "Name": "One"}})),
            &contact_descriptor(),
        );
        assert_eq!(response.elements().len(), 1);
    }

    #[test]
    fn test_missing_collection_decodes_to_no_elements() {
        let response =
            SyncResponse::from_http(&http(json!({"Status": "OK"})), &contact_descriptor());
        assert!(response.elements().is_empty());
    }

    #[test]
    fn test_unwrapped_type_takes_body_as_element() {
        let response = SyncResponse::from_http(
            &http(json!({"Id": "f-1", "Name": "report.pdf"})),
            &attachment_descriptor(),
        );
        assert_eq!(response.elements().len(), 1);
        assert_eq!(response.element(0).unwrap()["Id"], json!("f-1"));
    }

    #[test]
    fn test_unwrapped_empty_body_decodes_to_no_elements() {
        let response = SyncResponse::from_http(&http(json!({})), &attachment_descriptor());
        assert!(response.elements().is_empty());
    }

    #[test]
    fn test_status_attribute_error_is_detected() {
        let response = SyncResponse::from_http(
            &http(json!({"Contacts": [
                {"ContactID": "a", "StatusAttributeString": "OK"},
                {"StatusAttributeString": "ERROR", "ValidationErrors": [
                    {"Message": "Name is required"},
                ]},
            ]})),
            &contact_descriptor(),
        );

        assert!(response.is_element_ok(0));
        assert!(!response.is_element_ok(1));
        assert_eq!(
            response.error_at(1).unwrap().messages,
            vec!["Name is required".to_string()]
        );
    }

    #[test]
    fn test_validation_errors_without_status_flag_are_detected() {
        let response = SyncResponse::from_http(
            &http(json!({"Contacts": [
                {"ValidationErrors": [{"Message": "Duplicate name"}]},
            ]})),
            &contact_descriptor(),
        );
        assert!(response.has_errors());
        assert!(!response.is_element_ok(0));
    }

    #[test]
    fn test_out_of_range_index_is_not_ok() {
        let response = SyncResponse::from_http(
            &http(json!({"Contacts": [{"ContactID": "a"}]})),
            &contact_descriptor(),
        );
        assert!(!response.is_element_ok(5));
    }
}
