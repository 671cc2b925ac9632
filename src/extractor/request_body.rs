//! Request body extraction from the first `@Body` parameter.

use super::parameters::{simplify_type, DOCUMENTED_PROPERTY_ANNOTATIONS};
use crate::annotation_args::{is_object_literal, keyed_string, property_doc, string_literal};
use crate::declarations::{find_annotation, has_optional_marker, MemberDecl, MethodDecl};
use crate::model::{BodySchema, PropertySpec, RequestBodySpec};
use log::debug;

/// Binding annotation that marks the request body
pub const BODY_ANNOTATION: &str = "Body";

/// Builds the request body of a method, if one of its parameters is bound to the body.
///
/// Members of the parameter's resolved shape become schema properties. A member is
/// required unless it is declared optional, carries an optional annotation, or its
/// documentation says `required: false`. `@Body('field')` documents just that field.
pub fn extract_request_body(method: &MethodDecl) -> Option<RequestBodySpec> {
    let (param, binding) = method
        .parameters
        .iter()
        .find_map(|p| p.annotation(BODY_ANNOTATION).map(|a| (p, a)))?;

    let type_name = simplify_type(param.type_text.as_deref());
    let mut schema = BodySchema::default();

    match binding.first_argument().and_then(string_literal) {
        Some(field) => {
            if !param.optional {
                schema.required.push(field.clone());
            }
            schema.properties.insert(
                field,
                PropertySpec {
                    property_type: type_name.clone(),
                    description: String::new(),
                    example: None,
                },
            );
        }
        None => match &param.shape {
            Some(shape) => {
                for member in &shape.members {
                    let (property, required) = member_property(member);
                    if required && !schema.required.contains(&member.name) {
                        schema.required.push(member.name.clone());
                    }
                    schema.properties.insert(member.name.clone(), property);
                }
            }
            None => debug!(
                "Request body of {} has unresolved type {}; no properties",
                method.name, type_name
            ),
        },
    }

    Some(RequestBodySpec {
        description: body_description(method),
        required: !param.optional,
        type_name,
        schema,
    })
}

fn member_property(member: &MemberDecl) -> (PropertySpec, bool) {
    let doc = property_doc(
        find_annotation(&member.annotations, DOCUMENTED_PROPERTY_ANNOTATIONS)
            .and_then(|a| a.first_argument()),
    );

    let optional = member.optional
        || has_optional_marker(&member.annotations)
        || doc.required == Some(false);

    let property = PropertySpec {
        property_type: member.type_text.clone(),
        description: doc.description,
        example: doc.example,
    };
    (property, !optional)
}

/// `@ApiBody({ description })` on the method
fn body_description(method: &MethodDecl) -> String {
    find_annotation(&method.annotations, &["ApiBody"])
        .and_then(|a| a.first_argument())
        .filter(|arg| is_object_literal(arg))
        .and_then(|arg| keyed_string(arg, "description"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::{Annotation, ParamDecl, TypeShape};
    use crate::model::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn member(name: &str, type_text: &str, optional: bool, annotations: Vec<Annotation>) -> MemberDecl {
        MemberDecl {
            name: name.to_string(),
            type_text: type_text.to_string(),
            optional,
            annotations,
        }
    }

    fn body_method(binding: Annotation, shape: Option<TypeShape>, method_annotations: Vec<Annotation>) -> MethodDecl {
        MethodDecl {
            name: "create".to_string(),
            http_method: HttpMethod::Post,
            route_path: String::new(),
            annotations: method_annotations,
            doc_comment: None,
            parameters: vec![
                ParamDecl {
                    name: "id".to_string(),
                    annotations: vec![Annotation::new("Param", vec!["'id'".into()])],
                    type_text: Some("string".to_string()),
                    optional: false,
                    shape: None,
                },
                ParamDecl {
                    name: "dto".to_string(),
                    annotations: vec![binding],
                    type_text: Some("CreateUserDto".to_string()),
                    optional: false,
                    shape,
                },
            ],
        }
    }

    #[test]
    fn test_no_body_parameter() {
        let mut method = body_method(Annotation::new("Body", vec![]), None, vec![]);
        method.parameters.pop();
        assert!(extract_request_body(&method).is_none());
    }

    #[test]
    fn test_schema_from_shape() {
        let shape = TypeShape {
            members: vec![
                member(
                    "name",
                    "string",
                    false,
                    vec![Annotation::new(
                        "ApiProperty",
                        vec!["{ description: 'Display name', example: 'Ada' }".into()],
                    )],
                ),
                member("age", "number", true, vec![]),
                member(
                    "nickname",
                    "string",
                    false,
                    vec![Annotation::new("ApiProperty", vec!["{ required: false, example: null }".into()])],
                ),
                member("email", "string", false, vec![Annotation::new("IsOptional", vec![])]),
                member("active", "boolean", false, vec![]),
            ],
        };
        let method = body_method(
            Annotation::new("Body", vec![]),
            Some(shape),
            vec![Annotation::new("ApiBody", vec!["{ description: 'New user' }".into()])],
        );

        let body = extract_request_body(&method).unwrap();
        assert_eq!(body.description, "New user");
        assert_eq!(body.type_name, "CreateUserDto");
        assert!(body.required);
        assert_eq!(body.schema.required, vec!["name".to_string(), "active".to_string()]);

        let name = &body.schema.properties["name"];
        assert_eq!(name.description, "Display name");
        assert_eq!(name.example, Some(json!("Ada")));
        assert_eq!(body.schema.properties["nickname"].example, Some(json!(null)));

        let age = &body.schema.properties["age"];
        assert_eq!(age.property_type, "number");
        assert_eq!(age.description, "");
        assert_eq!(age.example, None);
    }

    #[test]
    fn test_named_body_field() {
        let method = body_method(Annotation::new("Body", vec!["'email'".into()]), None, vec![]);
        let body = extract_request_body(&method).unwrap();

        assert_eq!(body.schema.properties.len(), 1);
        assert_eq!(body.schema.properties["email"].property_type, "CreateUserDto");
        assert_eq!(body.schema.required, vec!["email".to_string()]);
    }

    #[test]
    fn test_unresolved_type_has_no_properties() {
        let method = body_method(Annotation::new("Body", vec![]), None, vec![]);
        let body = extract_request_body(&method).unwrap();
        assert!(body.schema.properties.is_empty());
        assert!(body.schema.required.is_empty());
        assert_eq!(body.description, "");
    }
}
