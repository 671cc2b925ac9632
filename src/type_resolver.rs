use crate::declarations::TypeShape;
use crate::inspector::syntax::{
    child_of_kind, class_field_shape, node_text, normalize_whitespace, object_type_shape,
};
use crate::parser::{AstParser, ParsedFile};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Maximum nesting followed through aliases, bases and imports
const MAX_DEPTH: usize = 8;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)import\s+(?:type\s+)?(?:[\w$]+\s*,\s*)?\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]"#)
        .unwrap()
});

static IMPORT_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^import\(\s*['"][^'"]*['"]\s*\)\."#).unwrap());

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap());

static PARTIAL_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PartialType\s*\(\s*([\w$.]+)\s*\)$").unwrap());

/// Type resolver - resolves named TypeScript types to their structural members.
///
/// Declarations are looked up in the unit that references them first, then in the modules
/// it imports through relative paths. Imported modules are parsed on demand and indexed once.
pub struct TypeResolver {
    /// Declaration index per module; `None` marks a module that could not be loaded
    modules: HashMap<PathBuf, Option<ModuleIndex>>,
    /// Track types currently being resolved to detect circular references
    resolving_stack: HashSet<String>,
}

/// Type declarations and relative imports of one module
#[derive(Debug, Clone, Default)]
struct ModuleIndex {
    declarations: HashMap<String, TypeDecl>,
    /// Local name -> (exported name, module specifier)
    imports: HashMap<String, (String, String)>,
}

#[derive(Debug, Clone)]
enum TypeDecl {
    /// Interface, class or object type alias; bases are type texts (`Partial<X>` allowed)
    Object { shape: TypeShape, bases: Vec<String> },
    /// Alias of a non-object type
    Alias(String),
}

impl TypeResolver {
    pub fn new() -> Self {
        debug!("Initializing TypeResolver");
        Self {
            modules: HashMap::new(),
            resolving_stack: HashSet::new(),
        }
    }

    /// Indexes an already parsed unit so its own declarations resolve without re-reading it
    pub fn register_unit(&mut self, unit: &ParsedFile) {
        if self.modules.contains_key(&unit.path) {
            return;
        }
        let index = ModuleIndex::from_parsed(unit);
        debug!(
            "Indexed {} declarations in {}",
            index.declarations.len(),
            unit.path.display()
        );
        self.modules.insert(unit.path.clone(), Some(index));
    }

    /// Resolves `type_text` as written in `module` to its structural members.
    ///
    /// Returns `None` for primitives, arrays, `any`, unknown names and cycles.
    pub fn resolve(&mut self, module: &Path, type_text: &str) -> Option<TypeShape> {
        self.resolve_at(module, type_text, 0)
    }

    /// Expands alias names in the member types of an inline shape
    pub fn expand_members(&mut self, module: &Path, shape: TypeShape) -> TypeShape {
        let members = shape
            .members
            .into_iter()
            .map(|mut m| {
                m.type_text = self.expand_alias(module, &m.type_text, 0);
                m
            })
            .collect();
        TypeShape { members }
    }

    fn resolve_at(&mut self, module: &Path, type_text: &str, depth: usize) -> Option<TypeShape> {
        if depth > MAX_DEPTH {
            warn!("Type resolution depth exceeded for {}", type_text);
            return None;
        }

        let text = normalize_type_text(type_text);
        if matches!(text.as_str(), "" | "any" | "unknown" | "object" | "void") {
            return None;
        }

        if let Some(inner) = generic_argument(&text, "Partial") {
            return self
                .resolve_at(module, &inner, depth + 1)
                .map(TypeShape::into_partial);
        }

        if text.contains('|') {
            let variants: Vec<&str> = text
                .split('|')
                .map(str::trim)
                .filter(|v| !matches!(*v, "null" | "undefined" | ""))
                .collect();
            return match variants.as_slice() {
                [single] => self.resolve_at(module, single, depth + 1),
                _ => None,
            };
        }

        if text.ends_with("[]") || text.starts_with("Array<") {
            return None;
        }

        let name = base_type_name(&text)?;
        let key = format!("{}::{}", module.display(), name);
        if !self.resolving_stack.insert(key.clone()) {
            warn!("Circular reference detected for type: {}", name);
            return None;
        }

        let result = match self.lookup(module, &name, 0) {
            Some((origin, TypeDecl::Object { shape, bases })) => {
                Some(self.build_shape(&origin, shape, bases, depth))
            }
            Some((origin, TypeDecl::Alias(alias))) => self.resolve_at(&origin, &alias, depth + 1),
            None => {
                debug!("Could not resolve type {} from {}", name, module.display());
                None
            }
        };

        self.resolving_stack.remove(&key);
        result
    }

    /// Inherited members first, then own members overriding them by name
    fn build_shape(
        &mut self,
        origin: &Path,
        own: TypeShape,
        bases: Vec<String>,
        depth: usize,
    ) -> TypeShape {
        let mut shape = TypeShape::default();

        for base in bases {
            if let Some(inherited) = self.resolve_at(origin, &base, depth + 1) {
                for member in inherited.members {
                    shape.upsert(member);
                }
            }
        }

        for mut member in own.members {
            member.type_text = self.expand_alias(origin, &member.type_text, depth);
            shape.upsert(member);
        }

        shape
    }

    /// Replaces a bare alias name with the aliased type text
    fn expand_alias(&mut self, module: &Path, type_text: &str, depth: usize) -> String {
        let text = normalize_type_text(type_text);
        if depth > MAX_DEPTH || !IDENTIFIER_RE.is_match(&text) {
            return text;
        }
        match self.lookup(module, &text, 0) {
            Some((origin, TypeDecl::Alias(alias))) => self.expand_alias(&origin, &alias, depth + 1),
            _ => text,
        }
    }

    /// Finds a declaration visible from `module`, following relative imports
    fn lookup(&mut self, module: &Path, name: &str, hops: usize) -> Option<(PathBuf, TypeDecl)> {
        if hops > MAX_DEPTH || !self.ensure_module(module) {
            return None;
        }
        let index = self.modules.get(module)?.as_ref()?;

        if let Some(decl) = index.declarations.get(name) {
            return Some((module.to_path_buf(), decl.clone()));
        }

        let (exported, specifier) = index.imports.get(name)?.clone();
        let target = resolve_import_path(module, &specifier)?;
        debug!("Following import of {} to {}", name, target.display());
        self.lookup(&target, &exported, hops + 1)
    }

    /// Loads and indexes a module on first use; returns whether it is available
    fn ensure_module(&mut self, path: &Path) -> bool {
        if let Some(entry) = self.modules.get(path) {
            return entry.is_some();
        }

        let index = match AstParser::parse_file(path) {
            Ok(parsed) => Some(ModuleIndex::from_parsed(&parsed)),
            Err(e) => {
                debug!("Skipping module for type resolution: {}", e);
                None
            }
        };
        let available = index.is_some();
        self.modules.insert(path.to_path_buf(), index);
        available
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleIndex {
    fn from_parsed(unit: &ParsedFile) -> Self {
        let src = unit.source.as_bytes();
        let root = unit.tree.root_node();
        let mut index = ModuleIndex::default();

        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            let node = if statement.kind() == "export_statement" {
                match statement.child_by_field_name("declaration") {
                    Some(declaration) => declaration,
                    None => continue,
                }
            } else {
                statement
            };

            match node.kind() {
                "import_statement" => index.add_imports(node_text(node, src)),
                "class_declaration" | "abstract_class_declaration" => index.add_class(node, src),
                "interface_declaration" => index.add_interface(node, src),
                "type_alias_declaration" => index.add_type_alias(node, src),
                _ => {}
            }
        }

        index
    }

    fn add_imports(&mut self, text: &str) {
        let Some(caps) = IMPORT_RE.captures(text) else {
            return;
        };
        let specifier = caps[2].to_string();

        for item in caps[1].split(',') {
            let item = item.trim();
            let item = item.strip_prefix("type ").unwrap_or(item).trim();
            if item.is_empty() {
                continue;
            }
            let (exported, local) = match item.split_once(" as ") {
                Some((exported, local)) => (exported.trim(), local.trim()),
                None => (item, item),
            };
            self.imports
                .insert(local.to_string(), (exported.to_string(), specifier.clone()));
        }
    }

    fn add_class(&mut self, node: Node, src: &[u8]) {
        let (Some(name), Some(body)) = (node.child_by_field_name("name"), node.child_by_field_name("body"))
        else {
            return;
        };

        let bases = child_of_kind(node, "class_heritage")
            .and_then(|heritage| child_of_kind(heritage, "extends_clause"))
            .map(|extends| class_bases(node_text(extends, src)))
            .unwrap_or_default();

        self.declarations.insert(
            node_text(name, src).to_string(),
            TypeDecl::Object {
                shape: class_field_shape(body, src),
                bases,
            },
        );
    }

    fn add_interface(&mut self, node: Node, src: &[u8]) {
        let (Some(name), Some(body)) = (node.child_by_field_name("name"), node.child_by_field_name("body"))
        else {
            return;
        };

        let bases = child_of_kind(node, "extends_type_clause")
            .map(|clause| {
                let text = normalize_whitespace(node_text(clause, src));
                let list = text.strip_prefix("extends").unwrap_or(&text).to_string();
                crate::annotation_args::split_top_level(&list, ',')
            })
            .unwrap_or_default();

        self.declarations.insert(
            node_text(name, src).to_string(),
            TypeDecl::Object {
                shape: object_type_shape(body, src),
                bases,
            },
        );
    }

    fn add_type_alias(&mut self, node: Node, src: &[u8]) {
        let (Some(name), Some(value)) = (node.child_by_field_name("name"), node.child_by_field_name("value"))
        else {
            return;
        };

        let decl = match value.kind() {
            "object_type" => TypeDecl::Object {
                shape: object_type_shape(value, src),
                bases: Vec::new(),
            },
            "intersection_type" => TypeDecl::Object {
                shape: TypeShape::default(),
                bases: normalize_whitespace(node_text(value, src))
                    .split('&')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect(),
            },
            _ => TypeDecl::Alias(normalize_whitespace(node_text(value, src))),
        };

        self.declarations.insert(node_text(name, src).to_string(), decl);
    }
}

/// Base type texts of a class `extends` clause; `PartialType(X)` becomes `Partial<X>`
fn class_bases(extends_text: &str) -> Vec<String> {
    let text = normalize_whitespace(extends_text);
    let base = text.strip_prefix("extends").unwrap_or(&text).trim().to_string();
    if base.is_empty() {
        return Vec::new();
    }
    match PARTIAL_TYPE_RE.captures(&base) {
        Some(caps) => vec![format!("Partial<{}>", &caps[1])],
        None => vec![base],
    }
}

/// Resolves a relative module specifier against the importing module's directory
fn resolve_import_path(module: &Path, specifier: &str) -> Option<PathBuf> {
    if !specifier.starts_with('.') {
        return None;
    }
    let dir = module.parent().unwrap_or_else(|| Path::new(""));
    let base = dir.join(specifier);
    let base_text = base.to_string_lossy();

    let candidates = [
        PathBuf::from(format!("{}.ts", base_text)),
        PathBuf::from(format!("{}.d.ts", base_text)),
        base.join("index.ts"),
        base.clone(),
    ];
    candidates.into_iter().find(|candidate| candidate.is_file())
}

/// Whitespace-normalised type text without an `import("...").` prefix
pub fn normalize_type_text(type_text: &str) -> String {
    let text = normalize_whitespace(type_text);
    IMPORT_PREFIX_RE.replace(&text, "").into_owned()
}

/// `Wrapper<Inner>` -> `Inner`
fn generic_argument(text: &str, wrapper: &str) -> Option<String> {
    let inner = text.strip_prefix(wrapper)?.trim_start().strip_prefix('<')?;
    let inner = inner.strip_suffix('>')?;
    Some(inner.trim().to_string())
}

/// `Page<User>` -> `Page`, `ns.Dto` -> `Dto`
fn base_type_name(text: &str) -> Option<String> {
    let head = text.split('<').next()?.trim();
    let name = head.rsplit('.').next()?.trim();
    if IDENTIFIER_RE.is_match(name) {
        Some(name.to_string())
    } else {
        None
    }
}
