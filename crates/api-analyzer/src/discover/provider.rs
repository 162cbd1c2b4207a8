//! Provider-side discovery: controller declarations

use tracing::debug;

use crate::discover::{
    extract_api_call, is_endpoint_method, Discovery, DiscoveryContext, EndpointDiscoverer,
    REQUEST_MAPPING,
};
use crate::error::AnalyzeResult;
use crate::syntax::TypeDecl;
use crate::types::ApiCall;

const CONTROLLER: &str = "RestController";
const GENERIC_CONTROLLER: &str = "Controller";
const RESPONSE_MARKER: &str = "ResponseBody";

/// Discovers endpoints the analyzed service exposes
pub struct ProviderDiscoverer;

impl EndpointDiscoverer for ProviderDiscoverer {
    fn name(&self) -> &'static str {
        "provider"
    }

    /// A controller-style annotation qualifies outright; a generic
    /// controller qualifies when at least one method serializes its
    /// response.
    fn should_consider(&self, decl: &TypeDecl) -> bool {
        decl.annotations.has(CONTROLLER)
            || (decl.annotations.has(GENERIC_CONTROLLER)
                && decl
                    .methods
                    .iter()
                    .any(|m| m.annotations.has(RESPONSE_MARKER)))
    }

    fn extract(&self, decl: &TypeDecl, cx: &DiscoveryContext) -> AnalyzeResult<Discovery> {
        let base_path = decl
            .annotations
            .value_of(REQUEST_MAPPING, "value")
            .unwrap_or_default();

        let calls: Vec<ApiCall> = decl
            .methods
            .iter()
            .filter(|m| is_endpoint_method(m))
            .map(|m| extract_api_call(m, &base_path, cx))
            .collect();

        debug!("Found {} endpoints in controller {}", calls.len(), decl.name);
        Ok(Discovery::Provided(calls))
    }
}
