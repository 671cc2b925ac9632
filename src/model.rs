//! In-memory endpoint description model.
//!
//! These types are the only interface between the extraction core and whatever renders
//! or stores the result. They are built once and then consumed read-only.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// HTTP methods recognised on controller methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Maps a verb annotation name (`Get`, `Post`, ...) to its method
    pub fn from_annotation(name: &str) -> Option<Self> {
        match name {
            "Get" => Some(HttpMethod::Get),
            "Post" => Some(HttpMethod::Post),
            "Put" => Some(HttpMethod::Put),
            "Delete" => Some(HttpMethod::Delete),
            "Patch" => Some(HttpMethod::Patch),
            "Head" => Some(HttpMethod::Head),
            "Options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    /// Get the HTTP method as an upper-case string
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// Where a parameter value is taken from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

/// A logical group of endpoints sharing one base path (one controller class).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    pub base_path: String,
    pub tag: Option<String>,
}

impl RouteGroup {
    pub fn new(base_path: String, tag: Option<String>) -> Self {
        Self { base_path, tag }
    }
}

/// A single non-body parameter of an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(rename = "type")]
    pub param_type: String,
    pub required: bool,
    pub description: String,
}

/// One property of a request body schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub property_type: String,
    pub description: String,
    /// Literal example; `Some(Value::Null)` is an explicit `null` example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Object schema of a request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySchema {
    pub properties: BTreeMap<String, PropertySpec>,
    /// Required property names in declaration order
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodySpec {
    pub description: String,
    pub required: bool,
    /// Declared type of the body parameter as written in source
    pub type_name: String,
    pub schema: BodySchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    pub description: String,
}

impl ResponseSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// The fully resolved description of one HTTP operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    /// Absolute path with `{name}` placeholders and no repeated separators
    pub path: String,
    #[serde(rename = "method")]
    pub http_method: HttpMethod,
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodySpec>,
    /// Keyed by status code; always holds `401` and `500`
    pub responses: BTreeMap<String, ResponseSpec>,
    pub operation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A titled, versioned collection of endpoints: the output of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSwagger {
    pub title: String,
    pub description: String,
    pub version: String,
    pub base_url: String,
    pub endpoints: Vec<EndpointRecord>,
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_from_annotation() {
        assert_eq!(HttpMethod::from_annotation("Get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_annotation("Options"), Some(HttpMethod::Options));
        assert_eq!(HttpMethod::from_annotation("get"), None);
        assert_eq!(HttpMethod::from_annotation("Controller"), None);
    }

    #[test]
    fn test_parameter_serializes_location_as_in() {
        let param = ParameterSpec {
            name: "id".to_string(),
            location: ParameterLocation::Path,
            param_type: "string".to_string(),
            required: true,
            description: String::new(),
        };
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["in"], "path");
        assert_eq!(json["type"], "string");
    }

    #[test]
    fn test_property_example_null_is_kept() {
        let with_null = PropertySpec {
            property_type: "string".to_string(),
            description: String::new(),
            example: Some(Value::Null),
        };
        let without = PropertySpec {
            example: None,
            ..with_null.clone()
        };

        let with_null = serde_json::to_value(&with_null).unwrap();
        let without = serde_json::to_value(&without).unwrap();
        assert!(with_null.as_object().unwrap().contains_key("example"));
        assert!(!without.as_object().unwrap().contains_key("example"));
    }
}
