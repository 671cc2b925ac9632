//! Declaration inspection for decorated controller sources.
//!
//! The inspector is the only part of the pipeline that walks syntax trees. It finds classes
//! carrying the `@Controller` route group annotation and lowers them, together with their
//! HTTP-verb methods and parameters, into the plain [`crate::declarations`] model.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_controllers::inspector::{DeclarationSource, TypeScriptInspector};
//! use openapi_from_controllers::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("src/users/users.controller.ts")).unwrap();
//! let mut inspector = TypeScriptInspector::new();
//! for controller in inspector.route_groups(&parsed) {
//!     println!("{} ({} methods)", controller.base_path, controller.methods.len());
//! }
//! ```

pub mod syntax;

use crate::annotation_args::{is_object_literal, keyed_value, split_top_level, string_literal};
use crate::declarations::{
    has_optional_marker, Annotation, ControllerDecl, MethodDecl, ParamDecl,
};
use crate::model::HttpMethod;
use crate::parser::ParsedFile;
use crate::type_resolver::TypeResolver;
use log::debug;
use std::path::Path;
use syntax::{
    class_members, collect_nodes, decorators_of, node_text, normalize_whitespace,
    object_type_shape, strip_doc_comment, type_annotation_inner, ClassMember,
};
use tree_sitter::Node;

/// Name of the route group annotation
pub const ROUTE_GROUP_ANNOTATION: &str = "Controller";

/// Narrow access to annotated declarations of one source unit.
///
/// Implementations hide the concrete syntax tree so the endpoint extraction algorithm only
/// sees declarations, annotations, parameters and resolved type shapes.
pub trait DeclarationSource {
    /// Every class carrying the route group annotation, with its HTTP-verb methods
    fn route_groups(&mut self, unit: &ParsedFile) -> Vec<ControllerDecl>;

    /// Documentation block attached to the unit's first statement, markers stripped
    fn unit_description(&self, unit: &ParsedFile) -> String;
}

/// Tree-sitter backed [`DeclarationSource`] for TypeScript.
pub struct TypeScriptInspector {
    resolver: TypeResolver,
}

impl TypeScriptInspector {
    pub fn new() -> Self {
        Self {
            resolver: TypeResolver::new(),
        }
    }

    fn route_methods(&mut self, class_node: Node, src: &[u8], unit_path: &Path) -> Vec<MethodDecl> {
        let Some(body) = class_node.child_by_field_name("body") else {
            return Vec::new();
        };

        class_members(body, src)
            .into_iter()
            .filter(|member| member.node.kind() == "method_definition")
            .filter_map(|member| self.route_method(member, src, unit_path))
            .collect()
    }

    fn route_method(&mut self, member: ClassMember, src: &[u8], unit_path: &Path) -> Option<MethodDecl> {
        let name = member
            .node
            .child_by_field_name("name")
            .map(|n| node_text(n, src).to_string())
            .unwrap_or_default();

        let Some((http_method, verb)) = member
            .annotations
            .iter()
            .find_map(|a| HttpMethod::from_annotation(&a.name).map(|m| (m, a)))
        else {
            debug!("Skipping method {} without an HTTP verb annotation", name);
            return None;
        };
        let route_path = route_path_argument(verb);

        let parameters = member
            .node
            .child_by_field_name("parameters")
            .map(|params| {
                let mut cursor = params.walk();
                let nodes: Vec<Node> = params
                    .named_children(&mut cursor)
                    .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
                    .collect();
                nodes
            })
            .unwrap_or_default()
            .into_iter()
            .map(|node| self.parameter(node, src, unit_path))
            .collect();

        Some(MethodDecl {
            name,
            http_method,
            route_path,
            annotations: member.annotations,
            doc_comment: member.doc_comment,
            parameters,
        })
    }

    fn parameter(&mut self, node: Node, src: &[u8], unit_path: &Path) -> ParamDecl {
        let annotations = decorators_of(node, src);
        let name = node
            .child_by_field_name("pattern")
            .map(|p| node_text(p, src).to_string())
            .unwrap_or_default();

        let type_node = node
            .child_by_field_name("type")
            .and_then(type_annotation_inner);
        let type_text = type_node.map(|t| normalize_whitespace(node_text(t, src)));

        let optional = node.kind() == "optional_parameter"
            || node.child_by_field_name("value").is_some()
            || has_optional_marker(&annotations);

        let shape = match type_node {
            Some(t) if t.kind() == "object_type" => {
                let inline = object_type_shape(t, src);
                Some(self.resolver.expand_members(unit_path, inline))
            }
            Some(_) => type_text
                .as_deref()
                .and_then(|text| self.resolver.resolve(unit_path, text)),
            None => None,
        };

        ParamDecl {
            name,
            annotations,
            type_text,
            optional,
            shape,
        }
    }
}

impl Default for TypeScriptInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationSource for TypeScriptInspector {
    fn route_groups(&mut self, unit: &ParsedFile) -> Vec<ControllerDecl> {
        self.resolver.register_unit(unit);

        let src = unit.source.as_bytes();
        let mut classes = Vec::new();
        collect_nodes(
            unit.tree.root_node(),
            &["class_declaration", "abstract_class_declaration"],
            &mut classes,
        );

        let mut controllers = Vec::new();
        for class_node in classes {
            let annotations = class_annotations(class_node, src);
            let Some(route_group) = annotations.iter().find(|a| a.name == ROUTE_GROUP_ANNOTATION)
            else {
                continue;
            };

            let base_path = normalize_base_path(&route_path_argument(route_group));
            let name = class_node
                .child_by_field_name("name")
                .map(|n| node_text(n, src).to_string());
            debug!(
                "Found controller {} with base path '{}'",
                name.as_deref().unwrap_or("<anonymous>"),
                base_path
            );

            let methods = self.route_methods(class_node, src, &unit.path);
            controllers.push(ControllerDecl {
                name,
                base_path,
                methods,
            });
        }

        controllers
    }

    fn unit_description(&self, unit: &ParsedFile) -> String {
        let src = unit.source.as_bytes();
        let root = unit.tree.root_node();

        let mut doc: Option<&str> = None;
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() != "comment" {
                break;
            }
            let text = node_text(child, src);
            doc = if text.starts_with("/**") { Some(text) } else { None };
        }

        doc.map(strip_doc_comment).unwrap_or_default()
    }
}

/// Class decorators, including those written before an `export` keyword
fn class_annotations(class_node: Node, src: &[u8]) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    if let Some(parent) = class_node.parent() {
        if parent.kind() == "export_statement" {
            annotations.extend(decorators_of(parent, src));
        }
    }
    annotations.extend(decorators_of(class_node, src));
    annotations
}

/// Path argument of a route group or verb annotation.
///
/// Handles a string literal, an array of alternatives (the shortest wins, first seen on a
/// tie), an options object with a `path` key, and absence. Anything else yields an empty
/// path.
pub fn route_path_argument(annotation: &Annotation) -> String {
    let Some(argument) = annotation.first_argument() else {
        return String::new();
    };
    path_from_expression(argument).unwrap_or_else(|| {
        debug!(
            "Unsupported path argument in @{}: {}",
            annotation.name, argument
        );
        String::new()
    })
}

fn path_from_expression(text: &str) -> Option<String> {
    let text = text.trim();

    if let Some(literal) = string_literal(text) {
        return Some(literal);
    }

    if text.starts_with('[') && text.ends_with(']') {
        return split_top_level(&text[1..text.len() - 1], ',')
            .iter()
            .filter_map(|alt| string_literal(alt))
            .min_by_key(|alt| alt.len());
    }

    if is_object_literal(text) {
        return keyed_value(text, "path").and_then(|value| path_from_expression(&value));
    }

    None
}

/// Base paths always start with `/`; an absent path stays empty
fn normalize_base_path(path: &str) -> String {
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn inspect(code: &str) -> (Vec<ControllerDecl>, String) {
        let parsed =
            AstParser::parse_source(Path::new("users.controller.ts"), code.to_string()).unwrap();
        let mut inspector = TypeScriptInspector::new();
        let controllers = inspector.route_groups(&parsed);
        let description = inspector.unit_description(&parsed);
        (controllers, description)
    }

    #[test]
    fn test_route_path_argument_forms() {
        let cases = [
            (vec!["'users'"], "users"),
            (vec!["\"/users\""], "/users"),
            (vec!["['short', '/api/edge/long/short']"], "short"),
            (vec!["['ab', 'cd']"], "ab"),
            (vec!["{ path: 'admin', version: '1' }"], "admin"),
            (vec!["ROUTES.users"], ""),
            (vec![], ""),
        ];

        for (arguments, expected) in cases {
            let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
            let annotation = Annotation::new("Controller", args);
            assert_eq!(route_path_argument(&annotation), expected);
        }
    }

    #[test]
    fn test_shortest_alternative_base_path() {
        let (controllers, _) = inspect(
            r#"
            @Controller(['short', '/api/edge/long/short'])
            export class ShortController {}
            "#,
        );
        assert_eq!(controllers.len(), 1);
        assert_eq!(controllers[0].base_path, "/short");
    }

    #[test]
    fn test_filters_classes_and_methods() {
        let (controllers, _) = inspect(
            r#"
            export class PlainService {
              @Get() notARoute() {}
            }

            @Controller()
            export class HealthController {
              constructor(private readonly service: PlainService) {}

              @Get('live')
              live() {}

              helper() {}

              @Delete(':id')
              remove(@Param('id') id: string) {}
            }
            "#,
        );

        assert_eq!(controllers.len(), 1);
        let controller = &controllers[0];
        assert_eq!(controller.name.as_deref(), Some("HealthController"));
        assert_eq!(controller.base_path, "");

        let methods: Vec<_> = controller
            .methods
            .iter()
            .map(|m| (m.name.as_str(), m.http_method, m.route_path.as_str()))
            .collect();
        assert_eq!(
            methods,
            vec![
                ("live", HttpMethod::Get, "live"),
                ("remove", HttpMethod::Delete, ":id"),
            ]
        );
    }

    #[test]
    fn test_parameters_with_types_and_optionality() {
        let (controllers, _) = inspect(
            r#"
            interface ListQuery { page?: number; size: number }

            @Controller('users')
            export class UsersController {
              @Get()
              list(
                @Query() query: ListQuery,
                @Query('sort') sort?: string,
                @Headers('x-trace') @IsOptional() trace: string,
                @Query('limit') limit = 10,
                @Body() body: { name: string; age?: number },
              ) {}
            }
            "#,
        );

        let params = &controllers[0].methods[0].parameters;
        assert_eq!(params.len(), 5);

        assert_eq!(params[0].name, "query");
        assert_eq!(params[0].type_text.as_deref(), Some("ListQuery"));
        assert!(!params[0].optional);
        let shape = params[0].shape.as_ref().unwrap();
        assert_eq!(shape.members.len(), 2);

        assert!(params[1].optional);
        assert_eq!(params[1].annotations[0].arguments, vec!["'sort'"]);
        assert!(params[2].optional);
        assert!(params[3].optional);

        let body_shape = params[4].shape.as_ref().unwrap();
        let names: Vec<_> = body_shape.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert!(body_shape.members[1].optional);
    }

    #[test]
    fn test_doc_comment_and_file_description() {
        let (controllers, description) = inspect(
            r#"
            /**
             * User management endpoints.
             */
            @Controller('users')
            export class UsersController {
              /**
               * Returns all users.
               */
              @Get()
              findAll() {}
            }
            "#,
        );

        assert_eq!(description, "User management endpoints.");
        let doc = controllers[0].methods[0].doc_comment.as_deref().unwrap();
        assert_eq!(strip_doc_comment(doc), "Returns all users.");
    }

    #[test]
    fn test_resolves_imported_dto() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("dto")).unwrap();
        fs::write(
            temp_dir.path().join("dto/create-user.dto.ts"),
            "export class CreateUserDto { @ApiProperty() name: string; }",
        )
        .unwrap();
        let path = temp_dir.path().join("users.controller.ts");
        let code = r#"
            import { CreateUserDto } from './dto/create-user.dto';

            @Controller('users')
            export class UsersController {
              @Post()
              create(@Body() dto: CreateUserDto) {}
            }
        "#;
        fs::write(&path, code).unwrap();

        let parsed = AstParser::parse_file(&path).unwrap();
        let mut inspector = TypeScriptInspector::new();
        let controllers = inspector.route_groups(&parsed);

        let shape = controllers[0].methods[0].parameters[0].shape.as_ref().unwrap();
        assert_eq!(shape.members[0].name, "name");
    }
}
