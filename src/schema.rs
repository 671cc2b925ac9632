use crate::model::{BodySchema, PropertySpec};
use crate::type_resolver::normalize_type_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, array, object)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }
}

/// Maps TypeScript type text to an OpenAPI schema.
///
/// Arrays (`T[]`, `Array<T>`, `ReadonlyArray<T>`) keep their item type; anything that
/// is not a known primitive becomes `object`.
pub fn schema_for_type(type_text: &str) -> Schema {
    let text = normalize_type_text(type_text);
    let text = text.trim();

    if let Some(inner) = text.strip_suffix("[]") {
        return array_of(inner);
    }
    for wrapper in ["Array<", "ReadonlyArray<"] {
        if let Some(inner) = text.strip_prefix(wrapper).and_then(|t| t.strip_suffix('>')) {
            return array_of(inner);
        }
    }
    if let Some(inner) = text.strip_prefix("Promise<").and_then(|t| t.strip_suffix('>')) {
        return schema_for_type(inner);
    }

    if text.contains('|') {
        return Schema::typed("string");
    }

    match text {
        "string" => Schema::typed("string"),
        "number" => Schema::typed("number"),
        "bigint" => Schema::typed("integer"),
        "boolean" => Schema::typed("boolean"),
        "Date" => Schema {
            format: Some("date-time".to_string()),
            ..Schema::typed("string")
        },
        _ => Schema::typed("object"),
    }
}

fn array_of(inner: &str) -> Schema {
    let inner = inner.trim();
    let inner = inner
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(inner);
    Schema {
        items: Some(Box::new(schema_for_type(inner))),
        ..Schema::typed("array")
    }
}

/// Schema of one documented body property
pub fn schema_for_property(property: &PropertySpec) -> Schema {
    let mut schema = schema_for_type(&property.property_type);
    if !property.description.is_empty() {
        schema.description = Some(property.description.clone());
    }
    schema.example = property.example.clone();
    schema
}

/// Object schema of a request body
pub fn schema_for_body(body: &BodySchema) -> Schema {
    let properties = body
        .properties
        .iter()
        .map(|(name, property)| (name.clone(), schema_for_property(property)))
        .collect();

    Schema {
        properties: Some(properties),
        required: (!body.required.is_empty()).then(|| body.required.clone()),
        ..Schema::typed("object")
    }
}
