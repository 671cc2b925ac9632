use crate::model::{EndpointRecord, HttpMethod, ParsedSwagger, Tag};
use crate::schema::{schema_for_body, schema_for_type, Schema};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL path -> PathItem)
    paths: BTreeMap<String, PathItem>,
    tags: Vec<Tag>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: BTreeMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: None,
            },
            paths: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Starts a builder from an extracted collection, with its info, tags and endpoints
    pub fn from_collection(collection: &ParsedSwagger) -> Self {
        let description = Some(collection.description.clone()).filter(|d| !d.is_empty());
        let mut builder = Self::new().with_info(
            collection.title.clone(),
            collection.version.clone(),
            description,
        );
        builder.tags = collection.tags.clone();
        for endpoint in &collection.endpoints {
            builder.add_endpoint(endpoint);
        }
        builder
    }

    /// Add an endpoint to the OpenAPI document
    pub fn add_endpoint(&mut self, endpoint: &EndpointRecord) {
        debug!("Adding endpoint: {} {}", endpoint.http_method.as_str(), endpoint.path);

        let parameters = if endpoint.parameters.is_empty() {
            None
        } else {
            let params: Vec<Parameter> = endpoint
                .parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    location: p.location.as_str().to_string(),
                    required: p.required,
                    schema: schema_for_type(&p.param_type),
                    description: non_empty(&p.description),
                })
                .collect();
            Some(params)
        };

        let request_body = endpoint.request_body.as_ref().map(|body| {
            let mut content = BTreeMap::new();
            content.insert(
                "application/json".to_string(),
                MediaType {
                    schema: schema_for_body(&body.schema),
                },
            );
            RequestBody {
                description: non_empty(&body.description),
                required: body.required,
                content,
            }
        });

        let responses = endpoint
            .responses
            .iter()
            .map(|(code, response)| {
                (
                    code.clone(),
                    Response {
                        description: response.description.clone(),
                    },
                )
            })
            .collect();

        let operation = Operation {
            tags: endpoint.tags.clone(),
            summary: non_empty(&endpoint.summary),
            description: non_empty(&endpoint.description),
            operation_id: non_empty(&endpoint.operation_id),
            parameters,
            request_body,
            responses,
        };

        // Add operation to the appropriate path and method
        let path_item = self.paths.entry(endpoint.path.clone()).or_default();

        let slot = match endpoint.http_method {
            HttpMethod::Get => &mut path_item.get,
            HttpMethod::Post => &mut path_item.post,
            HttpMethod::Put => &mut path_item.put,
            HttpMethod::Delete => &mut path_item.delete,
            HttpMethod::Patch => &mut path_item.patch,
            HttpMethod::Options => &mut path_item.options,
            HttpMethod::Head => &mut path_item.head,
        };
        if slot.is_some() {
            debug!(
                "Replacing duplicate operation {} {}",
                endpoint.http_method.as_str(),
                endpoint.path
            );
        }
        *slot = Some(operation);
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            tags: self.tags,
            paths: self.paths,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BodySchema, ParameterLocation, ParameterSpec, PropertySpec, RequestBodySpec, ResponseSpec,
    };

    fn endpoint(path: &str, method: HttpMethod) -> EndpointRecord {
        let mut responses = BTreeMap::new();
        responses.insert("401".to_string(), ResponseSpec::new("Unauthorized"));
        responses.insert("500".to_string(), ResponseSpec::new("Internal Server Error"));
        EndpointRecord {
            path: path.to_string(),
            http_method: method,
            tags: vec!["users".to_string()],
            summary: String::new(),
            description: String::new(),
            parameters: Vec::new(),
            request_body: None,
            responses,
            operation_id: "handler".to_string(),
        }
    }

    #[test]
    fn test_new_builder() {
        let builder = OpenApiBuilder::new();

        assert_eq!(builder.info.title, "Generated API");
        assert_eq!(builder.info.version, "1.0.0");
        assert!(builder.paths.is_empty());
    }

    #[test]
    fn test_with_info() {
        let builder = OpenApiBuilder::new().with_info(
            "My API".to_string(),
            "2.0.0".to_string(),
            Some("Custom description".to_string()),
        );

        assert_eq!(builder.info.title, "My API");
        assert_eq!(builder.info.version, "2.0.0");
        assert_eq!(builder.info.description, Some("Custom description".to_string()));
    }

    #[test]
    fn test_methods_share_path_item() {
        let mut builder = OpenApiBuilder::new();
        builder.add_endpoint(&endpoint("/users", HttpMethod::Get));
        builder.add_endpoint(&endpoint("/users", HttpMethod::Post));
        builder.add_endpoint(&endpoint("/users/{id}", HttpMethod::Delete));

        let doc = builder.build();
        assert_eq!(doc.paths.len(), 2);
        let users = &doc.paths["/users"];
        assert!(users.get.is_some());
        assert!(users.post.is_some());
        assert!(users.put.is_none());
        assert!(doc.paths["/users/{id}"].delete.is_some());
    }

    #[test]
    fn test_parameters_body_and_responses() {
        let mut record = endpoint("/users/{id}", HttpMethod::Put);
        record.summary = "Update user".to_string();
        record.parameters.push(ParameterSpec {
            name: "id".to_string(),
            location: ParameterLocation::Path,
            param_type: "number".to_string(),
            required: true,
            description: "User id".to_string(),
        });
        let mut schema = BodySchema::default();
        schema.properties.insert(
            "name".to_string(),
            PropertySpec {
                property_type: "string".to_string(),
                description: String::new(),
                example: None,
            },
        );
        record.request_body = Some(RequestBodySpec {
            description: String::new(),
            required: true,
            type_name: "UpdateUserDto".to_string(),
            schema,
        });

        let mut builder = OpenApiBuilder::new();
        builder.add_endpoint(&record);
        let doc = builder.build();

        let op = doc.paths["/users/{id}"].put.as_ref().unwrap();
        assert_eq!(op.summary.as_deref(), Some("Update user"));
        assert!(op.description.is_none());
        assert_eq!(op.operation_id.as_deref(), Some("handler"));

        let params = op.parameters.as_ref().unwrap();
        assert_eq!(params[0].location, "path");
        assert_eq!(params[0].schema.schema_type.as_deref(), Some("number"));
        assert_eq!(params[0].description.as_deref(), Some("User id"));

        let body = op.request_body.as_ref().unwrap();
        let media = &body.content["application/json"];
        assert!(media.schema.properties.as_ref().unwrap().contains_key("name"));

        let codes: Vec<_> = op.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["401", "500"]);
    }

    #[test]
    fn test_from_collection() {
        let collection = ParsedSwagger {
            title: "Users".to_string(),
            description: String::new(),
            version: "0.3.0".to_string(),
            base_url: String::new(),
            endpoints: vec![endpoint("/users", HttpMethod::Get)],
            tags: vec![Tag {
                name: "users".to_string(),
                description: None,
            }],
        };

        let doc = OpenApiBuilder::from_collection(&collection).build();
        assert_eq!(doc.openapi, "3.0.0");
        assert_eq!(doc.info.title, "Users");
        assert_eq!(doc.info.version, "0.3.0");
        assert!(doc.info.description.is_none());
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.paths["/users"].get.as_ref().unwrap().tags, vec!["users".to_string()]);
    }
}
