//! Report assembly
//!
//! Walks the source root once, parses every unit, builds the shared symbol
//! index, runs the discovery strategies per unit in parallel and merges the
//! results into one immutable [`ServiceReport`]. Failures stay file-scoped:
//! the walk always completes and a report is always produced for a reachable
//! source root.

use ignore::WalkBuilder;
use indexmap::map::Entry;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{AnalyzerConfig, ParamResolver};
use crate::discover::{discover_unit, Discovery, DiscoveryContext};
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::index::SymbolIndex;
use crate::resolver::TypeSchemaResolver;
use crate::syntax::{JavaUnitParser, SourceUnit};
use crate::types::{ConsumedEndpoint, ServiceReport};

/// Counts for one analysis pass.
///
/// A host distinguishes "nothing found" from "everything failed" through
/// these counts; failures never surface as errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanSummary {
    /// Source files found under the root
    pub files_seen: usize,
    /// Units parsed cleanly
    pub units_parsed: usize,
    /// Files that could not be read or parsed without errors
    pub parse_failures: usize,
}

/// One-shot API-surface analyzer
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Extract the service report for a source tree
    pub fn extract_report(&self, source_root: &Path) -> AnalyzeResult<ServiceReport> {
        self.run(source_root).map(|(report, _)| report)
    }

    /// Extract the service report along with scan counts
    pub fn run(&self, source_root: &Path) -> AnalyzeResult<(ServiceReport, ScanSummary)> {
        if !source_root.is_dir() {
            return Err(AnalyzeError::SourceRootNotFound(source_root.to_path_buf()));
        }

        let files = collect_source_files(source_root);
        info!(
            "Analyzing {} source files under {:?}",
            files.len(),
            source_root
        );

        // Each file is read once and parsed independently; a bad file only
        // costs its own unit.
        let parsed: Vec<Option<SourceUnit>> = files
            .par_iter()
            .map(|path| parse_one(path))
            .collect();

        let files_seen = files.len();
        let unreadable = parsed.iter().filter(|unit| unit.is_none()).count();
        let units: Vec<SourceUnit> = parsed.into_iter().flatten().collect();
        let salvaged = units.iter().filter(|unit| unit.had_errors).count();

        let summary = ScanSummary {
            files_seen,
            units_parsed: units.len() - salvaged,
            parse_failures: unreadable + salvaged,
        };

        let index = SymbolIndex::build(&units);
        let params = ParamResolver::new(self.config.parameters.clone());

        let discoveries: Vec<Vec<Discovery>> = units
            .par_iter()
            .map(|unit| {
                let cx = DiscoveryContext {
                    resolver: TypeSchemaResolver::new(&index),
                    params: &params,
                };
                discover_unit(unit, &cx)
            })
            .collect();

        let report = self.assemble(discoveries.into_iter().flatten());
        info!(
            "Extracted {} provided endpoints, {} consumed clients ({} parse failures)",
            report.provided_endpoints.len(),
            report.consumed_endpoints.len(),
            summary.parse_failures
        );

        Ok((report, summary))
    }

    /// Sequential merge: provided calls append in unit order; consumed
    /// records collapse to one entry per client identity, concatenating
    /// calls in discovery order.
    fn assemble(&self, discoveries: impl Iterator<Item = Discovery>) -> ServiceReport {
        let mut provided = Vec::new();
        let mut consumed: IndexMap<String, ConsumedEndpoint> = IndexMap::new();

        for discovery in discoveries {
            match discovery {
                Discovery::Provided(calls) => provided.extend(calls),
                Discovery::Consumed { identity, endpoint } => match consumed.entry(identity) {
                    Entry::Occupied(mut existing) => {
                        existing.get_mut().api_calls.extend(endpoint.api_calls);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(endpoint);
                    }
                },
            }
        }

        ServiceReport {
            environment: self.config.environment.clone(),
            organization_name: self.config.organization_name.clone(),
            product_name: self.config.product_name.clone(),
            application_name: self.config.application_name.clone(),
            provided_endpoints: provided,
            consumed_endpoints: consumed.into_values().collect(),
        }
    }
}

/// Extract a service report with an optional configuration
pub fn extract_report(
    source_root: &Path,
    config: Option<AnalyzerConfig>,
) -> AnalyzeResult<ServiceReport> {
    Analyzer::new(config.unwrap_or_default()).extract_report(source_root)
}

/// All `.java` files under the root, sorted for deterministic output order
fn collect_source_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "java"))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn parse_one(path: &Path) -> Option<SourceUnit> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            warn!("Could not read {:?}: {}", path, e);
            return None;
        }
    };

    let mut parser = match JavaUnitParser::new() {
        Ok(parser) => parser,
        Err(e) => {
            warn!("Front end unavailable: {}", e);
            return None;
        }
    };

    match parser.parse_unit(path, &source) {
        Ok(unit) => {
            if unit.had_errors {
                warn!("Syntax errors in {:?}, salvaging declarations", path);
            }
            Some(unit)
        }
        Err(e) => {
            warn!("Could not parse {:?}: {}", path, e);
            None
        }
    }
}
