//! Consumer-side discovery: declarative HTTP-client interfaces

use tracing::{debug, warn};

use crate::config::ParamResolver;
use crate::discover::{
    extract_api_call, is_endpoint_method, Discovery, DiscoveryContext, EndpointDiscoverer,
    REQUEST_MAPPING,
};
use crate::error::AnalyzeResult;
use crate::paths;
use crate::syntax::{TypeDecl, TypeKind};
use crate::types::{ApiCall, ConsumedEndpoint};

const CLIENT: &str = "FeignClient";

/// Fallback identity when a client annotation names nothing at all
const UNKNOWN_APPLICATION: &str = "unknown-application";

/// Discovers endpoints the analyzed service calls on other services
pub struct ConsumerDiscoverer;

impl EndpointDiscoverer for ConsumerDiscoverer {
    fn name(&self) -> &'static str {
        "consumer"
    }

    fn should_consider(&self, decl: &TypeDecl) -> bool {
        decl.kind == TypeKind::Interface && decl.annotations.has(CLIENT)
    }

    fn extract(&self, decl: &TypeDecl, cx: &DiscoveryContext) -> AnalyzeResult<Discovery> {
        let identity = client_identity(decl, cx.params);
        let base_path = base_path(decl);

        let calls: Vec<ApiCall> = decl
            .methods
            .iter()
            .filter(|m| is_endpoint_method(m))
            .map(|m| extract_api_call(m, &base_path, cx))
            .collect();

        debug!(
            "Found client {} with {} API calls in {}",
            identity,
            calls.len(),
            decl.name
        );

        Ok(Discovery::Consumed {
            endpoint: ConsumedEndpoint::from_identity(&identity, calls),
            identity,
        })
    }
}

/// Client identity priority: `name` attribute, `value` attribute (each
/// parametric-resolved, verbatim if unresolved), `url` attribute verbatim,
/// single positional value, then the fixed fallback.
fn client_identity(decl: &TypeDecl, params: &ParamResolver) -> String {
    let annotations = &decl.annotations;

    if let Some(name) = annotations.named(CLIENT, "name") {
        return resolve_or_verbatim(params, name);
    }
    if let Some(value) = annotations.named(CLIENT, "value") {
        return resolve_or_verbatim(params, value);
    }
    if let Some(url) = annotations.named(CLIENT, "url") {
        return url;
    }
    if let Some(positional) = annotations.single_value_of(CLIENT) {
        return resolve_or_verbatim(params, positional);
    }

    warn!(
        "No name, value, url or positional value on client {}",
        decl.name
    );
    UNKNOWN_APPLICATION.to_string()
}

fn resolve_or_verbatim(params: &ParamResolver, token: String) -> String {
    if ParamResolver::is_parametric(&token) {
        params.resolve(&token).unwrap_or(token)
    } else {
        token
    }
}

/// Client-level path attribute combined with an interface-level request
/// mapping.
fn base_path(decl: &TypeDecl) -> String {
    let client_path = decl.annotations.named(CLIENT, "path").unwrap_or_default();
    let mapping_path = decl
        .annotations
        .value_of(REQUEST_MAPPING, "value")
        .unwrap_or_default();
    paths::combine(&client_path, &mapping_path)
}
