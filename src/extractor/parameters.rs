//! Path, query and header parameter extraction.

use super::paths::path_placeholders;
use crate::annotation_args::{is_object_literal, keyed_string, property_doc, string_literal};
use crate::declarations::{find_annotation, has_optional_marker, MemberDecl, MethodDecl, ParamDecl};
use crate::model::{ParameterLocation, ParameterSpec};
use crate::type_resolver::normalize_type_text;
use log::{debug, warn};

/// Annotations documenting a member's description and example
pub const DOCUMENTED_PROPERTY_ANNOTATIONS: &[&str] = &["ApiProperty", "ApiPropertyOptional"];

/// Maps a binding annotation to the request location it reads from
pub fn binding_location(annotation_name: &str) -> Option<ParameterLocation> {
    match annotation_name {
        "Param" => Some(ParameterLocation::Path),
        "Query" => Some(ParameterLocation::Query),
        "Headers" | "Header" => Some(ParameterLocation::Header),
        _ => None,
    }
}

/// Method-level annotation that documents parameters of the given location
fn parameter_doc_annotation(location: ParameterLocation) -> Option<&'static str> {
    match location {
        ParameterLocation::Path => Some("ApiParam"),
        ParameterLocation::Query => Some("ApiQuery"),
        ParameterLocation::Header => Some("ApiHeader"),
        ParameterLocation::Cookie => None,
    }
}

/// Simplified type text for a parameter.
///
/// Missing types become `any`, unions become `string`, and compiler-emitted
/// `import("...").` prefixes are removed.
pub fn simplify_type(type_text: Option<&str>) -> String {
    let Some(text) = type_text.map(str::trim).filter(|t| !t.is_empty()) else {
        return "any".to_string();
    };
    if text.contains('|') {
        return "string".to_string();
    }
    normalize_type_text(text)
}

/// Builds the parameter list of a method whose composed path is `path`.
///
/// Only parameters with a binding annotation contribute. Afterwards every path
/// parameter is guaranteed to have a `{name}` placeholder in `path` and every
/// placeholder a path parameter.
pub fn extract_parameters(method: &MethodDecl, path: &str) -> Vec<ParameterSpec> {
    let mut parameters: Vec<ParameterSpec> = method
        .parameters
        .iter()
        .flat_map(parameter_specs)
        .collect();

    for spec in &mut parameters {
        if spec.description.is_empty() {
            if let Some(description) = documented_description(method, spec) {
                spec.description = description;
            }
        }
    }

    let placeholders = path_placeholders(path);
    parameters.retain(|spec| {
        let keep = spec.location != ParameterLocation::Path || placeholders.contains(&spec.name);
        if !keep {
            warn!(
                "Dropping path parameter '{}' of {}: no placeholder in {}",
                spec.name, method.name, path
            );
        }
        keep
    });

    for placeholder in placeholders {
        let declared = parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Path && p.name == placeholder);
        if !declared {
            debug!("Adding implicit path parameter '{}' for {}", placeholder, path);
            parameters.push(ParameterSpec {
                description: documented_path_description(method, &placeholder),
                name: placeholder,
                location: ParameterLocation::Path,
                param_type: "string".to_string(),
                required: true,
            });
        }
    }

    parameters
}

fn parameter_specs(param: &ParamDecl) -> Vec<ParameterSpec> {
    let Some((binding, location)) = param
        .annotations
        .iter()
        .find_map(|a| binding_location(&a.name).map(|location| (a, location)))
    else {
        return Vec::new();
    };

    let wire_name = binding.first_argument().and_then(string_literal);

    if let Some(name) = wire_name {
        return vec![ParameterSpec {
            name,
            location,
            param_type: simplify_type(param.type_text.as_deref()),
            required: !param.optional,
            description: String::new(),
        }];
    }

    match &param.shape {
        Some(shape) if !shape.members.is_empty() => shape
            .members
            .iter()
            .map(|member| member_spec(member, location, param.optional))
            .collect(),
        _ => vec![ParameterSpec {
            name: param.name.clone(),
            location,
            param_type: simplify_type(param.type_text.as_deref()),
            required: !param.optional,
            description: String::new(),
        }],
    }
}

/// One parameter per member of an unnamed binding's resolved type.
///
/// An optional binding makes every expanded member optional.
fn member_spec(
    member: &MemberDecl,
    location: ParameterLocation,
    binding_optional: bool,
) -> ParameterSpec {
    let doc = property_doc(
        find_annotation(&member.annotations, DOCUMENTED_PROPERTY_ANNOTATIONS)
            .and_then(|a| a.first_argument()),
    );
    let optional = binding_optional
        || member.optional
        || has_optional_marker(&member.annotations)
        || doc.required == Some(false);

    ParameterSpec {
        name: member.name.clone(),
        location,
        param_type: simplify_type(Some(member.type_text.as_str())),
        required: !optional,
        description: doc.description,
    }
}

/// Description from a method-level `@ApiParam`/`@ApiQuery`/`@ApiHeader({ name, description })`
fn documented_description(method: &MethodDecl, spec: &ParameterSpec) -> Option<String> {
    let annotation_name = parameter_doc_annotation(spec.location)?;
    method
        .annotations
        .iter()
        .filter(|a| a.name == annotation_name)
        .filter_map(|a| a.first_argument())
        .filter(|arg| is_object_literal(arg))
        .find(|arg| keyed_string(arg, "name").as_deref() == Some(spec.name.as_str()))
        .and_then(|arg| keyed_string(arg, "description"))
}

fn documented_path_description(method: &MethodDecl, name: &str) -> String {
    let placeholder_spec = ParameterSpec {
        name: name.to_string(),
        location: ParameterLocation::Path,
        param_type: String::new(),
        required: true,
        description: String::new(),
    };
    documented_description(method, &placeholder_spec).unwrap_or_default()
}
