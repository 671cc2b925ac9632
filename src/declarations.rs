//! Parser-independent declaration model.
//!
//! The declaration inspector lowers a syntax tree into these plain values so the
//! endpoint extraction algorithm never touches syntax nodes directly.

use crate::model::HttpMethod;

/// Annotation names treated as "mark optional" on parameters and members
pub const OPTIONAL_ANNOTATIONS: &[&str] = &["IsOptional", "Optional", "ApiPropertyOptional"];

/// A decorator attached to a class, method, parameter or member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Callee name without any namespace qualifier (`Swagger.ApiProperty` -> `ApiProperty`)
    pub name: String,
    /// Raw source text of each call argument, trimmed
    pub arguments: Vec<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn first_argument(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// All arguments joined back into one comma separated text
    pub fn argument_text(&self) -> String {
        self.arguments.join(", ")
    }
}

/// Finds the first annotation with one of the given names
pub fn find_annotation<'a>(annotations: &'a [Annotation], names: &[&str]) -> Option<&'a Annotation> {
    annotations.iter().find(|a| names.contains(&a.name.as_str()))
}

/// Whether any annotation marks its target optional
pub fn has_optional_marker(annotations: &[Annotation]) -> bool {
    find_annotation(annotations, OPTIONAL_ANNOTATIONS).is_some()
}

/// A controller class carrying the route group annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerDecl {
    pub name: Option<String>,
    /// Base path chosen from the route group annotation, normalised with a leading `/`
    pub base_path: String,
    /// Only methods that carry an HTTP verb annotation
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub http_method: HttpMethod,
    /// Path fragment from the verb annotation, empty when absent
    pub route_path: String,
    pub annotations: Vec<Annotation>,
    /// Raw attached documentation block, comment markers included
    pub doc_comment: Option<String>,
    pub parameters: Vec<ParamDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub annotations: Vec<Annotation>,
    /// Declared type text, whitespace normalised
    pub type_text: Option<String>,
    /// Declared `?`, a default value, or an explicit optional annotation
    pub optional: bool,
    /// Structural members of the declared type, when it could be resolved
    pub shape: Option<TypeShape>,
}

impl ParamDecl {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }
}

/// Structural members of an interface, object literal type or DTO class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeShape {
    pub members: Vec<MemberDecl>,
}

impl TypeShape {
    /// Marks every member optional, as `Partial<T>` does
    pub fn into_partial(mut self) -> Self {
        for member in &mut self.members {
            member.optional = true;
        }
        self
    }

    /// Adds a member, replacing an earlier one with the same name in place
    pub fn upsert(&mut self, member: MemberDecl) {
        match self.members.iter_mut().find(|m| m.name == member.name) {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub name: String,
    /// Alias-expanded, whitespace normalised type text (`any` when undeclared)
    pub type_text: String,
    /// Declared with `?`
    pub optional: bool,
    pub annotations: Vec<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, type_text: &str) -> MemberDecl {
        MemberDecl {
            name: name.to_string(),
            type_text: type_text.to_string(),
            optional: false,
            annotations: Vec::new(),
        }
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut shape = TypeShape {
            members: vec![member("id", "number"), member("name", "string")],
        };
        shape.upsert(member("id", "string"));
        shape.upsert(member("email", "string"));

        let names: Vec<_> = shape.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "email"]);
        assert_eq!(shape.members[0].type_text, "string");
    }

    #[test]
    fn test_into_partial() {
        let shape = TypeShape {
            members: vec![member("id", "number")],
        }
        .into_partial();
        assert!(shape.members.iter().all(|m| m.optional));
    }

    #[test]
    fn test_optional_marker() {
        let annotations = vec![Annotation::new("IsString", vec![]), Annotation::new("IsOptional", vec![])];
        assert!(has_optional_marker(&annotations));
        assert!(!has_optional_marker(&annotations[..1]));
    }
}
