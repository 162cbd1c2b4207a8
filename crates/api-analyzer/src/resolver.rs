//! Type schema resolution
//!
//! Turns a resolved type reference into a canonical [`Schema`] node,
//! handling primitives, collections, maps, enumerations, inheritance and
//! cyclic references. Every failure degrades to a primitive carrying the
//! type's literal name; resolution never aborts a file.

use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

use crate::index::SymbolIndex;
use crate::schema::{ObjectField, Schema};
use crate::syntax::{TypeDecl, TypeKind, TypeRef};

const COLLECTION_TYPES: [&str; 9] = [
    "List",
    "Set",
    "Collection",
    "Iterable",
    "ArrayList",
    "LinkedList",
    "HashSet",
    "LinkedHashSet",
    "TreeSet",
];

const MAP_TYPES: [&str; 6] = [
    "Map",
    "HashMap",
    "LinkedHashMap",
    "TreeMap",
    "SortedMap",
    "ConcurrentHashMap",
];

const IGNORED_FIELD_MARKERS: [&str; 2] = ["JsonIgnore", "Transient"];
const ASSOCIATION_MARKERS: [&str; 4] = ["OneToOne", "OneToMany", "ManyToOne", "ManyToMany"];
const REQUIRED_MARKERS: [&str; 3] = ["NotNull", "NotEmpty", "NotBlank"];
const IGNORE_UNKNOWN_MARKER: &str = "JsonIgnoreProperties";
const SERIALIZED_VALUE_MARKER: &str = "JsonValue";
const RENAME_MARKER: &str = "JsonProperty";

/// How a resolution call treats serialization metadata
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Honor not-null/not-empty/not-blank markers on fields
    honor_required: bool,
    /// Surface ignore-unknown-properties metadata on objects
    surface_ignore_unknown: bool,
}

impl ResolveOptions {
    /// Request-body resolution: `required` only under a validation cascade,
    /// ignore-unknown metadata always surfaced.
    pub fn request_body(validated: bool) -> Self {
        Self {
            honor_required: validated,
            surface_ignore_unknown: true,
        }
    }

    /// Response-body resolution: ignore-unknown metadata is never surfaced.
    pub fn response_body() -> Self {
        Self {
            honor_required: true,
            surface_ignore_unknown: false,
        }
    }

    /// Path-variable and query-parameter resolution
    pub fn parameter() -> Self {
        Self::response_body()
    }
}

/// Resolves type references against the symbol index
pub struct TypeSchemaResolver<'a> {
    index: &'a SymbolIndex,
}

impl<'a> TypeSchemaResolver<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self { index }
    }

    /// Resolve one type reference to a schema node.
    ///
    /// The recursion guard lives for exactly this call; sibling resolutions
    /// never observe each other's in-progress types.
    pub fn resolve(&self, ty: &TypeRef, options: ResolveOptions) -> Schema {
        let mut guard = HashSet::new();
        self.resolve_guarded(ty, options, &mut guard)
    }

    fn resolve_guarded(
        &self,
        ty: &TypeRef,
        options: ResolveOptions,
        guard: &mut HashSet<String>,
    ) -> Schema {
        if ty.array_dims > 0 {
            return Schema::array(self.resolve_guarded(&ty.element(), options, guard));
        }

        let simple = ty.simple_name();

        if let Some(canonical) = canonical_primitive(simple) {
            return Schema::primitive(canonical);
        }

        if COLLECTION_TYPES.contains(&simple) {
            let items = match ty.args.first() {
                Some(element) => self.resolve_guarded(element, options, guard),
                None => Schema::primitive("Object"),
            };
            return Schema::array(items);
        }

        if MAP_TYPES.contains(&simple) && ty.args.len() == 2 {
            let key = self.resolve_guarded(&ty.args[0], options, guard);
            let value = self.resolve_guarded(&ty.args[1], options, guard);
            return Schema::map(key, value);
        }

        let Some(decl) = self.index.resolve_declaration(&ty.name) else {
            debug!("Could not resolve type, using literal name: {}", ty.raw);
            return Schema::primitive(ty.raw.clone());
        };

        match decl.kind {
            TypeKind::Enum => self.resolve_enum(decl),
            _ => self.resolve_object(decl, options, guard),
        }
    }

    /// Enumerations resolve to their serialized value type plus the constant
    /// names in declaration order. The value type comes from an accessor
    /// marked as the serialization value, else a conventional value getter,
    /// else String.
    fn resolve_enum(&self, decl: &TypeDecl) -> Schema {
        let accessor = decl
            .methods
            .iter()
            .find(|m| m.annotations.has(SERIALIZED_VALUE_MARKER))
            .or_else(|| {
                decl.methods
                    .iter()
                    .find(|m| matches!(m.name.as_str(), "getValue" | "value"))
            });

        let value_type = accessor
            .and_then(|m| canonical_primitive(m.return_type.simple_name()))
            .unwrap_or("String");

        Schema::Enum {
            value_type: value_type.to_string(),
            values: decl.constants.clone(),
        }
    }

    /// Composite resolution: merged own and ancestor fields, most-derived
    /// first, with serialization metadata applied per field.
    fn resolve_object(
        &self,
        decl: &TypeDecl,
        options: ResolveOptions,
        guard: &mut HashSet<String>,
    ) -> Schema {
        let identity = decl.qualified_name();
        if guard.contains(&identity) {
            // Cycle: reference the type by name instead of re-expanding
            return Schema::primitive(decl.name.clone());
        }
        guard.insert(identity.clone());

        let ancestors = self.index.ancestors_of(decl);
        let mut fields: IndexMap<String, ObjectField> = IndexMap::new();

        for source in std::iter::once(decl).chain(ancestors.iter().copied()) {
            for field in &source.fields {
                if field.annotations.has_any(&IGNORED_FIELD_MARKERS)
                    || field.annotations.has_any(&ASSOCIATION_MARKERS)
                {
                    continue;
                }

                let name = field
                    .annotations
                    .value_of(RENAME_MARKER, "value")
                    .unwrap_or_else(|| field.name.clone());
                if fields.contains_key(&name) {
                    // Subtype fields shadow same-named ancestor fields
                    continue;
                }

                let required =
                    options.honor_required && field.annotations.has_any(&REQUIRED_MARKERS);
                let schema = self.resolve_guarded(&field.ty, options, guard);
                fields.insert(name, ObjectField::new(schema, required));
            }
        }

        guard.remove(&identity);

        let ignore_unknown =
            options.surface_ignore_unknown && self.ignores_unknown(decl, &ancestors);

        Schema::Object {
            fields,
            ignore_unknown,
        }
    }

    /// Whether the declaration, or its nearest annotated ancestor, carries
    /// the ignore-unknown-properties marker.
    fn ignores_unknown(&self, decl: &TypeDecl, ancestors: &[&TypeDecl]) -> bool {
        std::iter::once(decl)
            .chain(ancestors.iter().copied())
            .find_map(|d| {
                if !d.annotations.has(IGNORE_UNKNOWN_MARKER) {
                    return None;
                }
                match d.annotations.named(IGNORE_UNKNOWN_MARKER, "ignoreUnknown") {
                    Some(flag) => Some(flag == "true"),
                    None => Some(true),
                }
            })
            .unwrap_or(false)
    }
}

/// Collapse boxed, unboxed and fully-qualified spellings to one canonical
/// name per concept.
fn canonical_primitive(simple_name: &str) -> Option<&'static str> {
    let canonical = match simple_name {
        "boolean" | "Boolean" => "Boolean",
        "byte" | "Byte" => "Byte",
        "char" | "Character" => "Character",
        "short" | "Short" => "Short",
        "int" | "Integer" => "Integer",
        "long" | "Long" => "Long",
        "float" | "Float" => "Float",
        "double" | "Double" => "Double",
        "String" | "CharSequence" => "String",
        "Date" | "LocalDate" => "Date",
        "LocalDateTime" | "ZonedDateTime" | "OffsetDateTime" | "Instant" | "Timestamp" => {
            "DateTime"
        }
        "LocalTime" | "Time" => "Time",
        "BigDecimal" => "BigDecimal",
        "BigInteger" => "BigInteger",
        "Object" => "Object",
        _ => return None,
    };
    Some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{JavaUnitParser, SourceUnit};
    use std::path::PathBuf;

    fn index_of(sources: &[&str]) -> SymbolIndex {
        let mut parser = JavaUnitParser::new().unwrap();
        let units: Vec<SourceUnit> = sources
            .iter()
            .enumerate()
            .map(|(i, src)| {
                parser
                    .parse_unit(&PathBuf::from(format!("Unit{}.java", i)), src)
                    .unwrap()
            })
            .collect();
        SymbolIndex::build(&units)
    }

    fn resolve_with(index: &SymbolIndex, ty: &str, options: ResolveOptions) -> Schema {
        TypeSchemaResolver::new(index).resolve(&TypeRef::parse(ty), options)
    }

    fn resolve(index: &SymbolIndex, ty: &str) -> Schema {
        resolve_with(index, ty, ResolveOptions::response_body())
    }

    fn object_fields(schema: &Schema) -> &IndexMap<String, ObjectField> {
        match schema {
            Schema::Object { fields, .. } => fields,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_primitive_spellings_collapse() {
        let index = index_of(&[]);
        assert_eq!(resolve(&index, "int"), Schema::primitive("Integer"));
        assert_eq!(resolve(&index, "Integer"), Schema::primitive("Integer"));
        assert_eq!(
            resolve(&index, "java.lang.Integer"),
            Schema::primitive("Integer")
        );
        assert_eq!(
            resolve(&index, "java.time.LocalDateTime"),
            Schema::primitive("DateTime")
        );
        assert_eq!(
            resolve(&index, "java.math.BigDecimal"),
            Schema::primitive("BigDecimal")
        );
    }

    #[test]
    fn test_collection_unwraps_element() {
        let index = index_of(&[]);
        assert_eq!(
            resolve(&index, "List<String>"),
            Schema::array(Schema::primitive("String"))
        );
        assert_eq!(
            resolve(&index, "java.util.Set<Long>"),
            Schema::array(Schema::primitive("Long"))
        );
    }

    #[test]
    fn test_raw_collection_defaults_to_object_items() {
        let index = index_of(&[]);
        assert_eq!(
            resolve(&index, "List"),
            Schema::array(Schema::primitive("Object"))
        );
    }

    #[test]
    fn test_two_argument_map() {
        let index = index_of(&[]);
        assert_eq!(
            resolve(&index, "Map<String, Integer>"),
            Schema::map(Schema::primitive("String"), Schema::primitive("Integer"))
        );
    }

    #[test]
    fn test_array_resolves_like_collection() {
        let index = index_of(&[]);
        assert_eq!(
            resolve(&index, "String[]"),
            Schema::array(Schema::primitive("String"))
        );
    }

    #[test]
    fn test_unresolvable_type_degrades_to_literal_name() {
        let index = index_of(&[]);
        assert_eq!(resolve(&index, "MysteryDto"), Schema::primitive("MysteryDto"));
    }

    #[test]
    fn test_object_fields_in_declaration_order() {
        let index = index_of(&[
            "public class OrderDto { private Long id; private String label; private List<String> tags; }",
        ]);
        let schema = resolve(&index, "OrderDto");
        let fields = object_fields(&schema);
        let names: Vec<&String> = fields.keys().collect();
        assert_eq!(names, vec!["id", "label", "tags"]);
        assert_eq!(fields["tags"].schema, Schema::array(Schema::primitive("String")));
    }

    #[test]
    fn test_self_referential_type_terminates() {
        let index = index_of(&["public class Node { private String label; private Node next; }"]);
        let schema = resolve(&index, "Node");
        let fields = object_fields(&schema);
        assert_eq!(fields["next"].schema, Schema::primitive("Node"));
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let index = index_of(&[
            "public class Parent { private List<Child> children; }",
            "public class Child { private Parent parent; }",
        ]);
        let schema = resolve(&index, "Parent");
        let fields = object_fields(&schema);
        let Schema::Array { items } = &fields["children"].schema else {
            panic!("expected array");
        };
        let child_fields = object_fields(items);
        assert_eq!(child_fields["parent"].schema, Schema::primitive("Parent"));
    }

    #[test]
    fn test_sibling_fields_of_same_type_both_expand() {
        // The guard is scoped per top-level call and cleared per subtree, so
        // two sibling fields of the same composite type both expand fully.
        let index = index_of(&[
            "public class Pair { private Point first; private Point second; }",
            "public class Point { private int x; private int y; }",
        ]);
        let schema = resolve(&index, "Pair");
        let fields = object_fields(&schema);
        assert!(matches!(fields["first"].schema, Schema::Object { .. }));
        assert!(matches!(fields["second"].schema, Schema::Object { .. }));
    }

    #[test]
    fn test_subtype_field_shadows_ancestor() {
        let index = index_of(&[
            "public class A { private int x; }",
            "public class B extends A { private String x; private int y; }",
        ]);
        let schema = resolve(&index, "B");
        let fields = object_fields(&schema);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["x"].schema, Schema::primitive("String"));
    }

    #[test]
    fn test_ignored_association_and_transient_fields_skipped() {
        let index = index_of(&[
            r#"
public class Account {
    private String iban;
    @JsonIgnore
    private String secret;
    @Transient
    private String cached;
    @OneToMany
    private List<Movement> movements;
}
"#,
        ]);
        let schema = resolve(&index, "Account");
        let fields = object_fields(&schema);
        let names: Vec<&String> = fields.keys().collect();
        assert_eq!(names, vec!["iban"]);
    }

    #[test]
    fn test_rename_marker_sets_external_name() {
        let index = index_of(&[
            "public class Account { @JsonProperty(\"accountNo\") private String number; }",
        ]);
        let schema = resolve(&index, "Account");
        let fields = object_fields(&schema);
        assert!(fields.contains_key("accountNo"));
        assert!(!fields.contains_key("number"));
    }

    #[test]
    fn test_required_follows_validation_markers() {
        let index = index_of(&[
            "public class ChargeRequest { @NotNull private String currency; private Long amount; }",
        ]);

        let validated = resolve_with(
            &index,
            "ChargeRequest",
            ResolveOptions::request_body(true),
        );
        let fields = object_fields(&validated);
        assert!(fields["currency"].required);
        assert!(!fields["amount"].required);

        let unvalidated = resolve_with(
            &index,
            "ChargeRequest",
            ResolveOptions::request_body(false),
        );
        let fields = object_fields(&unvalidated);
        assert!(!fields["currency"].required);
    }

    #[test]
    fn test_ignore_unknown_only_on_request_paths() {
        let sources = [
            "@JsonIgnoreProperties(ignoreUnknown = true)\npublic class Payload { private String id; }",
        ];
        let index = index_of(&sources);

        let request = resolve_with(&index, "Payload", ResolveOptions::request_body(false));
        assert!(matches!(request, Schema::Object { ignore_unknown: true, .. }));

        let response = resolve_with(&index, "Payload", ResolveOptions::response_body());
        assert!(matches!(response, Schema::Object { ignore_unknown: false, .. }));
    }

    #[test]
    fn test_ignore_unknown_inherited_from_nearest_ancestor() {
        let index = index_of(&[
            "@JsonIgnoreProperties\npublic class Base { private String id; }",
            "public class Payload extends Base { private String name; }",
        ]);
        let schema = resolve_with(&index, "Payload", ResolveOptions::request_body(false));
        assert!(matches!(schema, Schema::Object { ignore_unknown: true, .. }));
    }

    #[test]
    fn test_enum_with_marked_accessor() {
        let index = index_of(&[
            r#"
public enum Channel {
    WEB, MOBILE, BRANCH;

    @JsonValue
    public int getCode() { return ordinal(); }
}
"#,
        ]);
        let schema = resolve(&index, "Channel");
        assert_eq!(
            schema,
            Schema::Enum {
                value_type: "Integer".to_string(),
                values: vec!["WEB".to_string(), "MOBILE".to_string(), "BRANCH".to_string()],
            }
        );
    }

    #[test]
    fn test_enum_with_conventional_getter() {
        let index = index_of(&[
            r#"
public enum Channel {
    WEB, MOBILE;

    public String getValue() { return name(); }
}
"#,
        ]);
        let Schema::Enum { value_type, .. } = resolve(&index, "Channel") else {
            panic!("expected enum");
        };
        assert_eq!(value_type, "String");
    }

    #[test]
    fn test_bare_enum_defaults_to_string() {
        let index = index_of(&["public enum Channel { WEB, MOBILE }"]);
        let Schema::Enum { value_type, values } = resolve(&index, "Channel") else {
            panic!("expected enum");
        };
        assert_eq!(value_type, "String");
        assert_eq!(values, vec!["WEB", "MOBILE"]);
    }
}
