//! # api-analyzer
//!
//! Static API-surface extraction for Java services.
//! Walks a source tree, recognizes annotation-driven endpoint declarations
//! on both the provider side (controllers) and the consumer side
//! (declarative HTTP clients), and resolves parameter and payload types into
//! canonical schema nodes.
//!
//! ```rust,no_run
//! use api_analyzer::{extract_report, AnalyzerConfig};
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::from_file(Path::new("analyzer.yaml")).ok();
//! let report = extract_report(Path::new("src/main/java"), config).unwrap();
//! println!("{} provided endpoints", report.provided_endpoints.len());
//! ```

mod analyzer;
mod config;
mod discover;
mod error;
mod index;
mod paths;
mod resolver;
mod schema;
mod syntax;
mod types;

pub use analyzer::{extract_report, Analyzer, ScanSummary};
pub use config::{AnalyzerConfig, ParamResolver};
pub use discover::{
    ConsumerDiscoverer, Discovery, DiscoveryContext, EndpointDiscoverer, ProviderDiscoverer,
};
pub use error::{AnalyzeError, AnalyzeResult};
pub use index::SymbolIndex;
pub use paths::{combine, normalize};
pub use resolver::{ResolveOptions, TypeSchemaResolver};
pub use schema::{ObjectField, Schema};
pub use syntax::{
    Annotation, Annotations, FieldDecl, JavaUnitParser, MethodDecl, ParamDecl, SourceUnit,
    TypeDecl, TypeKind, TypeRef,
};
pub use types::{ApiCall, ConsumedEndpoint, HttpMethod, ServiceReport};
