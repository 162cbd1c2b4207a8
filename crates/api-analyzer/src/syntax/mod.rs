//! Lightweight syntax model for Java source units
//!
//! The tree-sitter front end reduces each source file to the declarations the
//! discoverers and the schema resolver care about: types with their
//! annotations, fields, methods and enum constants. Nothing outside this
//! module touches tree-sitter.

mod annotations;
mod parser;

pub use annotations::{Annotation, Annotations};
pub use parser::JavaUnitParser;

use std::path::PathBuf;

/// One parsed source file
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub types: Vec<TypeDecl>,
    /// Whether the front end reported syntax errors; declarations parsed
    /// before the error are still usable.
    pub had_errors: bool,
}

/// Kind of a type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

/// A class, interface or enum declaration
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// Simple (unqualified) name
    pub name: String,
    pub package: Option<String>,
    pub kind: TypeKind,
    pub annotations: Annotations,
    /// Supertypes named in `extends` (one for classes, any number for
    /// interfaces)
    pub extends: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    /// Enum constant names in declaration order
    pub constants: Vec<String>,
}

impl TypeDecl {
    /// Package-qualified name, used as the identity in recursion guards and
    /// index keys.
    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(pkg) => format!("{}.{}", pkg, self.name),
            None => self.name.clone(),
        }
    }
}

/// A field declaration
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub annotations: Annotations,
}

/// A method declaration
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: TypeRef,
    pub params: Vec<ParamDecl>,
    pub annotations: Annotations,
}

/// A method parameter
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
    pub annotations: Annotations,
}

/// A parsed type reference: possibly-qualified name, generic arguments and
/// array dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    /// The reference as spelled in source, trimmed
    pub raw: String,
    /// Possibly-qualified base name with generics stripped
    pub name: String,
    pub args: Vec<TypeRef>,
    pub array_dims: usize,
}

impl TypeRef {
    /// Parse a type reference from its source text.
    ///
    /// Wildcards collapse to their bound (`?` alone becomes `Object`);
    /// malformed generics degrade to a bare name carrying the literal text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if raw == "?" {
            return Self {
                raw: raw.to_string(),
                name: "Object".to_string(),
                args: Vec::new(),
                array_dims: 0,
            };
        }
        if let Some(bound) = raw
            .strip_prefix("? extends ")
            .or_else(|| raw.strip_prefix("? super "))
        {
            return Self::parse(bound);
        }

        let mut base = raw;
        let mut array_dims = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped.trim_end();
            array_dims += 1;
        }

        let (name, args) = match base.find('<') {
            Some(lt) if base.ends_with('>') => {
                let inner = &base[lt + 1..base.len() - 1];
                let args = split_top_level(inner).map(TypeRef::parse).collect();
                (base[..lt].trim().to_string(), args)
            }
            _ => (base.to_string(), Vec::new()),
        };

        Self {
            raw: raw.to_string(),
            name,
            args,
            array_dims,
        }
    }

    /// Last dot-segment of the base name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_void(&self) -> bool {
        self.array_dims == 0 && matches!(self.simple_name(), "void" | "Void")
    }

    /// The element reference of an array type, one dimension down
    pub fn element(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            name: self.name.clone(),
            args: self.args.clone(),
            array_dims: self.array_dims.saturating_sub(1),
        }
    }
}

/// Split a generic argument list on top-level commas only
fn split_top_level(inner: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut parts = Vec::new();

    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty())
}
