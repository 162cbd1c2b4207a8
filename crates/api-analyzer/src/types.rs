//! Report data model: endpoints, consumed clients and the service report

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// HTTP methods recognized by the discoverers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Parse a method name as spelled in a mapping annotation's `method`
    /// attribute, with any `RequestMethod.` enum prefix already stripped.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            "TRACE" => Some(HttpMethod::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One HTTP-reachable operation: method, full path and parameter/body shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall {
    pub http_method: HttpMethod,
    pub full_path: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub path_variables: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query_parameters: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Schema>,
}

/// Calls made against one remote client identity.
///
/// The naming fields derive from a dot-delimited client identifier; they stay
/// unset when the identifier is a literal URL, an unresolved placeholder, or
/// has fewer than three segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_application: Option<String>,
    pub api_calls: Vec<ApiCall>,
}

impl ConsumedEndpoint {
    /// Derive the naming fields from a client identity string.
    ///
    /// `"org.product.app"` yields the three leading segments; URLs,
    /// unresolved placeholders and identifiers with fewer than two dots
    /// yield none.
    pub fn from_identity(identity: &str, api_calls: Vec<ApiCall>) -> Self {
        let derivable = !identity.starts_with("http")
            && !identity.starts_with("${")
            && identity.matches('.').count() >= 2;

        let mut segments = identity.split('.');
        let (client_organization, client_product, client_application) = if derivable {
            (
                segments.next().map(str::to_string),
                segments.next().map(str::to_string),
                segments.next().map(str::to_string),
            )
        } else {
            (None, None, None)
        };

        Self {
            client_organization,
            client_product,
            client_application,
            api_calls,
        }
    }
}

/// The immutable result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReport {
    pub environment: String,
    pub organization_name: String,
    pub product_name: String,
    pub application_name: String,
    pub provided_endpoints: Vec<ApiCall>,
    pub consumed_endpoints: Vec<ConsumedEndpoint>,
}
