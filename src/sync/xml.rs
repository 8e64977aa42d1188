//! Structured-markup encoding for wrapped resource types.
//!
//! Resource types with a non-empty root node name are persisted as XML
//! bodies: a single payload wrapped under the root node, or a batch wrapped
//! under the pluralized root node with one child element per item. The
//! remote API still answers in JSON (the transport asks for it), so no
//! markup decoding exists here.

use serde_json::{Map, Value};

/// Pluralizes a root node name for batch wrapping (e.g., `Contact` ->
/// `Contacts`, `Company` -> `Companies`).
#[must_use]
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let lower = name.to_lowercase();
    if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
        format!("{}ies", &name[..name.len() - 1])
    } else if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        format!("{name}es")
    } else {
        format!("{name}s")
    }
}

/// Singularizes a node name, the inverse of [`pluralize`] for the node
/// names this API uses.
#[must_use]
pub fn singularize(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with("ies") {
        format!("{}y", &name[..name.len() - 3])
    } else if lower.ends_with("ses")
        || lower.ends_with("xes")
        || lower.ends_with("zes")
        || lower.ends_with("ches")
        || lower.ends_with("shes")
    {
        name[..name.len() - 2].to_string()
    } else if lower.ends_with('s') {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

fn ends_with_vowel_y(lower: &str) -> bool {
    let bytes = lower.as_bytes();
    bytes.len() >= 2
        && bytes[bytes.len() - 1] == b'y'
        && matches!(bytes[bytes.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Encodes a single payload under the given root node name.
#[must_use]
pub fn encode(root_node: &str, fields: &Map<String, Value>) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(root_node);
    out.push('>');
    write_fields(&mut out, fields);
    out.push_str("</");
    out.push_str(root_node);
    out.push('>');
    out
}

/// Encodes a batch of payloads under the given (already pluralized) root
/// node name, one child element per item.
#[must_use]
pub fn encode_collection(plural_root: &str, items: &[Map<String, Value>]) -> String {
    let child = singularize(plural_root);
    let mut out = String::new();
    out.push('<');
    out.push_str(plural_root);
    out.push('>');
    for item in items {
        out.push('<');
        out.push_str(&child);
        out.push('>');
        write_fields(&mut out, item);
        out.push_str("</");
        out.push_str(&child);
        out.push('>');
    }
    out.push_str("</");
    out.push_str(plural_root);
    out.push('>');
    out
}

fn write_fields(out: &mut String, fields: &Map<String, Value>) {
    for (key, value) in fields {
        write_value(out, key, value);
    }
}

fn write_value(out: &mut String, key: &str, value: &Value) {
    match value {
        // Absent values are omitted rather than sent as empty nodes.
        Value::Null => {}
        Value::Object(nested) => {
            out.push('<');
            out.push_str(key);
            out.push('>');
            write_fields(out, nested);
            out.push_str("</");
            out.push_str(key);
            out.push('>');
        }
        Value::Array(items) => {
            // Collections nest each item under the singular of the key:
            // <LineItems><LineItem>...</LineItem></LineItems>
            let child = singularize(key);
            out.push('<');
            out.push_str(key);
            out.push('>');
            for item in items {
                write_value(out, &child, item);
            }
            out.push_str("</");
            out.push_str(key);
            out.push('>');
        }
        Value::String(s) => write_text(out, key, s),
        Value::Bool(b) => write_text(out, key, if *b { "true" } else { "false" }),
        Value::Number(n) => write_text(out, key, &n.to_string()),
    }
}

fn write_text(out: &mut String, key: &str, text: &str) {
    out.push('<');
    out.push_str(key);
    out.push('>');
    out.push_str(&escape(text));
    out.push_str("</");
    out.push_str(key);
    out.push('>');
}

/// Escapes XML special characters in text content.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_pluralize_common_forms() {
        assert_eq!(pluralize("Contact"), "Contacts");
        assert_eq!(pluralize("Invoice"), "Invoices");
        assert_eq!(pluralize("Company"), "Companies");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Tax"), "Taxes");
        assert_eq!(pluralize("Journey"), "Journeys");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_singularize_inverts_pluralize() {
        for name in ["Contact", "Invoice", "Company", "Address", "Tax"] {
            assert_eq!(singularize(&pluralize(name)), name);
        }
    }

    #[test]
    fn test_encode_simple_fields() {
        let fields = as_map(json!({"Name": "Acme", "Discount": 12.5}));
        let xml = encode("Contact", &fields);
        assert_eq!(
            xml,
            "<Contact><Name>Acme</Name><Discount>12.5</Discount></Contact>"
        );
    }

    #[test]
    fn test_encode_skips_null_values() {
        let fields = as_map(json!({"Name": "Acme", "TaxNumber": null}));
        let xml = encode("Contact", &fields);
        assert!(!xml.contains("TaxNumber"));
    }

    #[test]
    fn test_encode_nested_object() {
        let fields = as_map(json!({"Contact": {"Name": "Acme"}}));
        let xml = encode("Invoice", &fields);
        assert_eq!(
            xml,
            "<Invoice><Contact><Name>Acme</Name></Contact></Invoice>"
        );
    }

    #[test]
    fn test_encode_array_nests_singular_children() {
        let fields = as_map(json!({"LineItems": [{"Description": "Widget"}]}));
        let xml = encode("Invoice", &fields);
        assert_eq!(
            xml,
            "<Invoice><LineItems><LineItem><Description>Widget</Description></LineItem></LineItems></Invoice>"
        );
    }

    #[test]
    fn test_encode_escapes_special_characters() {
        let fields = as_map(json!({"Name": "Smith & Sons <Ltd>"}));
        let xml = encode("Contact", &fields);
        assert!(xml.contains("Smith &amp; Sons &lt;Ltd&gt;"));
    }

    #[test]
    fn test_encode_collection_wraps_each_item() {
        let items = vec![
            as_map(json!({"Name": "One"})),
            as_map(json!({"Name": "Two"})),
        ];
        let xml = encode_collection("Contacts", &items);
        assert_eq!(
            xml,
            "<Contacts><Contact><Name>One</Name></Contact><Contact><Name>Two</Name></Contact></Contacts>"
        );
    }

    #[test]
    fn test_encode_booleans_as_lowercase_text() {
        let fields = as_map(json!({"IsCustomer": true}));
        let xml = encode("Contact", &fields);
        assert_eq!(xml, "<Contact><IsCustomer>true</IsCustomer></Contact>");
    }
}
