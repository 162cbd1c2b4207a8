//! tree-sitter-java front end
//!
//! Reduces a parse tree to the syntax model. Declarations the analyzer has
//! no use for (constructors, initializer blocks, local classes' statements)
//! are not captured.

use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::error::{AnalyzeError, AnalyzeResult};
use crate::syntax::{
    Annotation, Annotations, FieldDecl, MethodDecl, ParamDecl, SourceUnit, TypeDecl, TypeKind,
    TypeRef,
};

/// Parses Java source files into [`SourceUnit`]s
pub struct JavaUnitParser {
    parser: Parser,
}

impl JavaUnitParser {
    pub fn new() -> AnalyzeResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| AnalyzeError::Grammar(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse one source file into a unit.
    ///
    /// Fails only when the front end produces no tree at all; a tree with
    /// syntax errors is salvaged and flagged via `had_errors`.
    pub fn parse_unit(&mut self, path: &Path, source: &str) -> AnalyzeResult<SourceUnit> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| AnalyzeError::UnitParse {
                path: path.to_path_buf(),
            })?;

        let root = tree.root_node();
        let package = package_of(root, source);
        let mut types = Vec::new();
        collect_types(root, source, package.as_deref(), &mut types);

        Ok(SourceUnit {
            path: path.to_path_buf(),
            types,
            had_errors: root.has_error(),
        })
    }
}

fn text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes())
        .unwrap_or_default()
        .to_string()
}

fn package_of(root: Node, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    let package = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_declaration")?;

    let mut inner = package.walk();
    let result = package
        .named_children(&mut inner)
        .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
        .map(|n| text(n, source));
    result
}

/// Collect every type declaration in the subtree, including nested ones
fn collect_types(node: Node, source: &str, package: Option<&str>, out: &mut Vec<TypeDecl>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "class_declaration" | "interface_declaration" | "enum_declaration" => {
                if let Some(decl) = parse_type(child, source, package) {
                    out.push(decl);
                }
                if let Some(body) = child.child_by_field_name("body") {
                    collect_types(body, source, package, out);
                }
            }
            _ => collect_types(child, source, package, out),
        }
    }
}

fn parse_type(node: Node, source: &str, package: Option<&str>) -> Option<TypeDecl> {
    let name = text(node.child_by_field_name("name")?, source);
    let kind = match node.kind() {
        "class_declaration" => TypeKind::Class,
        "interface_declaration" => TypeKind::Interface,
        "enum_declaration" => TypeKind::Enum,
        _ => return None,
    };

    let mut decl = TypeDecl {
        name,
        package: package.map(str::to_string),
        kind,
        annotations: annotations_of(node, source),
        extends: supertypes_of(node, source),
        fields: Vec::new(),
        methods: Vec::new(),
        constants: Vec::new(),
    };

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" => decl.fields.extend(parse_fields(member, source)),
                "method_declaration" => {
                    if let Some(method) = parse_method(member, source) {
                        decl.methods.push(method);
                    }
                }
                "enum_constant" => {
                    if let Some(name) = member.child_by_field_name("name") {
                        decl.constants.push(text(name, source));
                    }
                }
                "enum_body_declarations" => {
                    let mut inner = member.walk();
                    for item in member.named_children(&mut inner) {
                        match item.kind() {
                            "field_declaration" => decl.fields.extend(parse_fields(item, source)),
                            "method_declaration" => {
                                if let Some(method) = parse_method(item, source) {
                                    decl.methods.push(method);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Some(decl)
}

/// Supertype references from `extends`: the superclass for classes, the
/// extended interface list for interfaces.
fn supertypes_of(node: Node, source: &str) -> Vec<TypeRef> {
    let mut supertypes = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "superclass" => {
                let mut inner = child.walk();
                let first = child.named_children(&mut inner).next();
                if let Some(ty) = first {
                    supertypes.push(TypeRef::parse(&text(ty, source)));
                }
            }
            "extends_interfaces" => {
                let mut inner = child.walk();
                for list in child.named_children(&mut inner) {
                    if list.kind() == "type_list" {
                        let mut types = list.walk();
                        for ty in list.named_children(&mut types) {
                            supertypes.push(TypeRef::parse(&text(ty, source)));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    supertypes
}

/// One field declaration may declare several variables sharing a type and
/// annotation set.
fn parse_fields(node: Node, source: &str) -> Vec<FieldDecl> {
    let Some(ty_node) = node.child_by_field_name("type") else {
        return Vec::new();
    };
    let ty = TypeRef::parse(&text(ty_node, source));
    let annotations = annotations_of(node, source);

    let mut cursor = node.walk();
    node.children_by_field_name("declarator", &mut cursor)
        .filter_map(|declarator| {
            declarator
                .child_by_field_name("name")
                .map(|name| FieldDecl {
                    name: text(name, source),
                    ty: ty.clone(),
                    annotations: annotations.clone(),
                })
        })
        .collect()
}

fn parse_method(node: Node, source: &str) -> Option<MethodDecl> {
    let name = text(node.child_by_field_name("name")?, source);
    let return_type = TypeRef::parse(&text(node.child_by_field_name("type")?, source));

    let mut params = Vec::new();
    if let Some(parameters) = node.child_by_field_name("parameters") {
        let mut cursor = parameters.walk();
        for param in parameters.named_children(&mut cursor) {
            if param.kind() != "formal_parameter" {
                continue;
            }
            let (Some(ty), Some(param_name)) = (
                param.child_by_field_name("type"),
                param.child_by_field_name("name"),
            ) else {
                continue;
            };
            params.push(ParamDecl {
                name: text(param_name, source),
                ty: TypeRef::parse(&text(ty, source)),
                annotations: annotations_of(param, source),
            });
        }
    }

    Some(MethodDecl {
        name,
        return_type,
        params,
        annotations: annotations_of(node, source),
    })
}

/// Annotations live inside the declaration's `modifiers` child
fn annotations_of(node: Node, source: &str) -> Annotations {
    let mut annotations = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        if child.kind() != "modifiers" {
            continue;
        }
        let mut inner = child.walk();
        for modifier in child.children(&mut inner) {
            match modifier.kind() {
                "annotation" | "marker_annotation" => {
                    if let Some(annotation) = parse_annotation(modifier, source) {
                        annotations.push(annotation);
                    }
                }
                _ => {}
            }
        }
    }

    Annotations(annotations)
}

fn parse_annotation(node: Node, source: &str) -> Option<Annotation> {
    let name = text(node.child_by_field_name("name")?, source);
    let mut positional = None;
    let mut attributes = Vec::new();

    if let Some(arguments) = node.child_by_field_name("arguments") {
        let mut cursor = arguments.walk();
        for argument in arguments.named_children(&mut cursor) {
            if argument.kind() == "element_value_pair" {
                let (Some(key), Some(value)) = (
                    argument.child_by_field_name("key"),
                    argument.child_by_field_name("value"),
                ) else {
                    continue;
                };
                attributes.push((text(key, source), text(value, source)));
            } else if positional.is_none() {
                positional = Some(text(argument, source));
            }
        }
    }

    Some(Annotation {
        name,
        positional,
        attributes,
    })
}
