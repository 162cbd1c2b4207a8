//! Error types for the analyzer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for analyzer operations
pub type AnalyzeResult<T> = std::result::Result<T, AnalyzeError>;

/// Analyzer error types
///
/// Only `SourceRootNotFound`, `Io` and `Config` ever reach callers of the
/// public API. The remaining variants are file- or declaration-scoped: they
/// are logged, resolved through documented fallbacks, and never abort a run.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Source root not found or not a directory: {0}")]
    SourceRootNotFound(PathBuf),

    #[error("Failed to load Java grammar: {0}")]
    Grammar(String),

    #[error("Failed to parse source unit: {path}")]
    UnitParse { path: PathBuf },

    #[error("Could not resolve type: {0}")]
    TypeResolution(String),

    #[error("Malformed annotation: {0}")]
    AnnotationShape(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
