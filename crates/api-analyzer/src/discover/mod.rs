//! Endpoint discovery strategies
//!
//! A closed set of discoverers decides which declarations are endpoints and
//! converts them into call records. Both variants share the same
//! method-level extraction: HTTP method, combined path, parameter and body
//! schemas.

mod consumer;
mod provider;

pub use consumer::ConsumerDiscoverer;
pub use provider::ProviderDiscoverer;

use indexmap::IndexMap;
use tracing::warn;

use crate::config::ParamResolver;
use crate::error::AnalyzeResult;
use crate::paths;
use crate::resolver::{ResolveOptions, TypeSchemaResolver};
use crate::syntax::{MethodDecl, ParamDecl, SourceUnit, TypeDecl, TypeRef};
use crate::types::{ApiCall, ConsumedEndpoint, HttpMethod};

/// Everything a discoverer needs besides the declaration itself
pub struct DiscoveryContext<'a> {
    pub resolver: TypeSchemaResolver<'a>,
    pub params: &'a ParamResolver,
}

/// One discovered endpoint record
#[derive(Debug, Clone)]
pub enum Discovery {
    /// Endpoints this service exposes
    Provided(Vec<ApiCall>),
    /// Calls against one remote client identity; the identity string is the
    /// merge key used by the report assembler.
    Consumed {
        identity: String,
        endpoint: ConsumedEndpoint,
    },
}

/// Strategy interface for endpoint discovery
pub trait EndpointDiscoverer: Sync {
    fn name(&self) -> &'static str;

    /// Whether this declaration is an endpoint declaration for this strategy
    fn should_consider(&self, decl: &TypeDecl) -> bool;

    /// Convert a qualifying declaration into an endpoint record
    fn extract(&self, decl: &TypeDecl, cx: &DiscoveryContext) -> AnalyzeResult<Discovery>;
}

/// The closed registry of discovery strategies
pub fn registry() -> &'static [&'static dyn EndpointDiscoverer] {
    static REGISTRY: [&dyn EndpointDiscoverer; 2] = [&ProviderDiscoverer, &ConsumerDiscoverer];
    &REGISTRY
}

/// Run every discoverer over one unit. A failing declaration is logged and
/// skipped; it never aborts the unit.
pub fn discover_unit(unit: &SourceUnit, cx: &DiscoveryContext) -> Vec<Discovery> {
    registry()
        .iter()
        .flat_map(|discoverer| {
            unit.types
                .iter()
                .filter(|decl| discoverer.should_consider(decl))
                .filter_map(|decl| match discoverer.extract(decl, cx) {
                    Ok(found) => Some(found),
                    Err(e) => {
                        warn!(
                            "Skipping {} declaration {} in {:?}: {}",
                            discoverer.name(),
                            decl.name,
                            unit.path,
                            e
                        );
                        None
                    }
                })
        })
        .collect()
}

pub(crate) const REQUEST_MAPPING: &str = "RequestMapping";

const MAPPING_ANNOTATIONS: [&str; 6] = [
    REQUEST_MAPPING,
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "PatchMapping",
];

const VERB_SHORTHANDS: [(&str, HttpMethod); 5] = [
    ("GetMapping", HttpMethod::Get),
    ("PostMapping", HttpMethod::Post),
    ("PutMapping", HttpMethod::Put),
    ("DeleteMapping", HttpMethod::Delete),
    ("PatchMapping", HttpMethod::Patch),
];

/// Response wrappers that carry the payload as their single type argument
const RESPONSE_WRAPPERS: [&str; 6] = [
    "ResponseEntity",
    "HttpEntity",
    "Optional",
    "CompletableFuture",
    "CompletionStage",
    "Mono",
];

const VALIDATION_CASCADE_MARKERS: [&str; 2] = ["Valid", "Validated"];

pub(crate) fn is_endpoint_method(method: &MethodDecl) -> bool {
    method.annotations.has_any(&MAPPING_ANNOTATIONS)
}

/// HTTP method: shorthand identity first, else the generic mapping's
/// `method` attribute with the enum prefix stripped, defaulting to GET.
fn http_method_of(method: &MethodDecl) -> HttpMethod {
    for (shorthand, verb) in VERB_SHORTHANDS {
        if method.annotations.has(shorthand) {
            return verb;
        }
    }

    method
        .annotations
        .named(REQUEST_MAPPING, "method")
        .and_then(|value| {
            let value = value.trim_matches(|c| c == '{' || c == '}').trim();
            let first = value.split(',').next().unwrap_or(value).trim();
            let name = first.strip_prefix("RequestMethod.").unwrap_or(first);
            HttpMethod::from_name(name)
        })
        .unwrap_or(HttpMethod::Get)
}

/// Path declared on whichever mapping annotation the method carries
fn method_path(method: &MethodDecl) -> String {
    MAPPING_ANNOTATIONS
        .iter()
        .find_map(|annotation| method.annotations.value_of(annotation, "value"))
        .unwrap_or_default()
}

/// Parameter key: annotation-declared name first, else the declared name
fn param_name(param: &ParamDecl, annotation: &str) -> String {
    param
        .annotations
        .value_of(annotation, "value")
        .or_else(|| param.annotations.named(annotation, "name"))
        .unwrap_or_else(|| param.name.clone())
}

/// Shared method-level extraction used by both discoverers
pub(crate) fn extract_api_call(
    method: &MethodDecl,
    base_path: &str,
    cx: &DiscoveryContext,
) -> ApiCall {
    let full_path = paths::combine(base_path, &method_path(method));

    let mut path_variables = IndexMap::new();
    let mut query_parameters = IndexMap::new();
    let mut request_body = None;

    for param in &method.params {
        if param.annotations.has("PathVariable") {
            path_variables.insert(
                param_name(param, "PathVariable"),
                cx.resolver.resolve(&param.ty, ResolveOptions::parameter()),
            );
        } else if param.annotations.has("RequestParam") {
            query_parameters.insert(
                param_name(param, "RequestParam"),
                cx.resolver.resolve(&param.ty, ResolveOptions::parameter()),
            );
        } else if param.annotations.has("RequestBody") && request_body.is_none() {
            let validated = param.annotations.has_any(&VALIDATION_CASCADE_MARKERS);
            request_body = Some(
                cx.resolver
                    .resolve(&param.ty, ResolveOptions::request_body(validated)),
            );
        }
    }

    ApiCall {
        http_method: http_method_of(method),
        full_path,
        path_variables,
        query_parameters,
        request_body,
        response_body: response_schema(&method.return_type, cx),
    }
}

/// Response payload type: void yields none; single-argument wrappers unwrap
/// recursively, and an absent or void argument also yields none.
fn response_schema(return_type: &TypeRef, cx: &DiscoveryContext) -> Option<crate::schema::Schema> {
    let mut ty = return_type.clone();

    loop {
        if ty.is_void() {
            return None;
        }
        if ty.array_dims == 0 && RESPONSE_WRAPPERS.contains(&ty.simple_name()) {
            match ty.args.first() {
                Some(payload) => {
                    ty = payload.clone();
                    continue;
                }
                None => return None,
            }
        }
        break;
    }

    Some(cx.resolver.resolve(&ty, ResolveOptions::response_body()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamResolver;
    use crate::index::SymbolIndex;
    use crate::schema::Schema;
    use crate::syntax::JavaUnitParser;
    use std::path::PathBuf;

    fn units(sources: &[&str]) -> Vec<SourceUnit> {
        let mut parser = JavaUnitParser::new().unwrap();
        sources
            .iter()
            .enumerate()
            .map(|(i, src)| {
                parser
                    .parse_unit(&PathBuf::from(format!("Unit{}.java", i)), src)
                    .unwrap()
            })
            .collect()
    }

    fn discover(sources: &[&str]) -> Vec<Discovery> {
        discover_with_params(sources, ParamResolver::default())
    }

    fn discover_with_params(sources: &[&str], params: ParamResolver) -> Vec<Discovery> {
        let units = units(sources);
        let index = SymbolIndex::build(&units);
        let cx = DiscoveryContext {
            resolver: TypeSchemaResolver::new(&index),
            params: &params,
        };
        units
            .iter()
            .flat_map(|unit| discover_unit(unit, &cx))
            .collect()
    }

    fn provided_calls(discoveries: &[Discovery]) -> Vec<&ApiCall> {
        discoveries
            .iter()
            .filter_map(|d| match d {
                Discovery::Provided(calls) => Some(calls.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn consumed<'a>(discoveries: &'a [Discovery]) -> Vec<(&'a str, &'a ConsumedEndpoint)> {
        discoveries
            .iter()
            .filter_map(|d| match d {
                Discovery::Consumed { identity, endpoint } => {
                    Some((identity.as_str(), endpoint))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_shorthand_verb_wins_over_generic_mapping() {
        let discoveries = discover(&[r#"
@RestController
public class MixedController {
    @PostMapping("/submit")
    @RequestMapping(method = RequestMethod.GET)
    public void submit() {}
}
"#]);
        let calls = provided_calls(&discoveries);
        assert_eq!(calls[0].http_method, HttpMethod::Post);
    }

    #[test]
    fn test_generic_mapping_method_attribute() {
        let discoveries = discover(&[r#"
@RestController
public class LegacyController {
    @RequestMapping(value = "/submit", method = RequestMethod.DELETE)
    public void remove() {}
}
"#]);
        let calls = provided_calls(&discoveries);
        assert_eq!(calls[0].http_method, HttpMethod::Delete);
        assert_eq!(calls[0].full_path, "/submit");
    }

    #[test]
    fn test_generic_mapping_defaults_to_get() {
        let discoveries = discover(&[r#"
@RestController
public class PlainController {
    @RequestMapping("/list")
    public String list() { return ""; }
}
"#]);
        let calls = provided_calls(&discoveries);
        assert_eq!(calls[0].http_method, HttpMethod::Get);
    }

    #[test]
    fn test_generic_controller_needs_response_serializing_method() {
        let qualifying = discover(&[r#"
@Controller
public class PageController {
    @ResponseBody
    @GetMapping("/fragment")
    public String fragment() { return ""; }
}
"#]);
        assert_eq!(provided_calls(&qualifying).len(), 1);

        let not_qualifying = discover(&[r#"
@Controller
public class ViewController {
    @GetMapping("/page")
    public String page() { return "view"; }
}
"#]);
        assert!(provided_calls(&not_qualifying).is_empty());
    }

    #[test]
    fn test_query_parameters_and_annotation_names() {
        let discoveries = discover(&[r#"
@RestController
public class SearchController {
    @GetMapping("/search")
    public String search(@RequestParam("q") String query, @RequestParam int page) {
        return "";
    }
}
"#]);
        let calls = provided_calls(&discoveries);
        let params = &calls[0].query_parameters;
        assert_eq!(params["q"], Schema::primitive("String"));
        assert_eq!(params["page"], Schema::primitive("Integer"));
    }

    #[test]
    fn test_response_wrapper_unwrapping() {
        let discoveries = discover(&[r#"
@RestController
public class WrapController {
    @GetMapping("/a")
    public ResponseEntity<String> a() { return null; }

    @GetMapping("/b")
    public ResponseEntity<Void> b() { return null; }

    @GetMapping("/c")
    public CompletableFuture<ResponseEntity<String>> c() { return null; }

    @DeleteMapping("/d")
    public void d() {}
}
"#]);
        let calls = provided_calls(&discoveries);
        assert_eq!(calls[0].response_body, Some(Schema::primitive("String")));
        assert_eq!(calls[1].response_body, None);
        assert_eq!(calls[2].response_body, Some(Schema::primitive("String")));
        assert_eq!(calls[3].response_body, None);
    }

    #[test]
    fn test_request_body_required_needs_validation_cascade() {
        let sources = [
            r#"
@RestController
public class ChargeController {
    @PostMapping("/validated")
    public void validated(@Valid @RequestBody ChargeRequest request) {}

    @PostMapping("/plain")
    public void plain(@RequestBody ChargeRequest request) {}
}
"#,
            "public class ChargeRequest { @NotNull private String currency; }",
        ];
        let discoveries = discover(&sources);
        let calls = provided_calls(&discoveries);

        let Some(Schema::Object { fields, .. }) = &calls[0].request_body else {
            panic!("expected object body");
        };
        assert!(fields["currency"].required);

        let Some(Schema::Object { fields, .. }) = &calls[1].request_body else {
            panic!("expected object body");
        };
        assert!(!fields["currency"].required);
    }

    #[test]
    fn test_client_identity_chain() {
        let named = discover(&[r#"
@FeignClient(name = "org.billing.core", url = "http://localhost:1")
public interface A { }
"#]);
        assert_eq!(consumed(&named)[0].0, "org.billing.core");

        let url_only = discover(&[r#"
@FeignClient(url = "http://billing.internal")
public interface B { }
"#]);
        assert_eq!(consumed(&url_only)[0].0, "http://billing.internal");

        let positional = discover(&[r#"
@FeignClient("org.billing.core")
public interface C { }
"#]);
        assert_eq!(consumed(&positional)[0].0, "org.billing.core");

        let bare = discover(&["@FeignClient\npublic interface D { }"]);
        assert_eq!(consumed(&bare)[0].0, "unknown-application");
    }

    #[test]
    fn test_unresolved_placeholder_used_verbatim() {
        let discoveries = discover(&[r#"
@FeignClient(name = "${endpoint.unknown}")
public interface Mystery { }
"#]);
        let consumed = consumed(&discoveries);
        assert_eq!(consumed[0].0, "${endpoint.unknown}");
        assert_eq!(consumed[0].1.client_organization, None);
    }

    #[test]
    fn test_client_base_path_combines_with_interface_mapping() {
        let discoveries = discover(&[r#"
@FeignClient(name = "org.billing.core", path = "/api")
@RequestMapping("/v2")
public interface BillingClient {
    @GetMapping("/charges")
    String charges();
}
"#]);
        let consumed = consumed(&discoveries);
        assert_eq!(consumed[0].1.api_calls[0].full_path, "/api/v2/charges");
    }

    #[test]
    fn test_classes_are_not_clients() {
        let discoveries = discover(&[r#"
@FeignClient(name = "org.billing.core")
public class NotAnInterface { }
"#]);
        assert!(consumed(&discoveries).is_empty());
    }
}
