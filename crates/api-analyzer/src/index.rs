//! Whole-tree symbol index
//!
//! Built once per run from every parsed unit, then shared read-only across
//! workers. The rest of the crate consumes it through two operations:
//! declaration lookup by name and ancestor enumeration.

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::syntax::{SourceUnit, TypeDecl};

/// Index of every type declaration found under the source root
#[derive(Debug, Default)]
pub struct SymbolIndex {
    by_name: HashMap<String, TypeDecl>,
}

impl SymbolIndex {
    /// Build the index from all parsed units.
    ///
    /// Declarations are keyed by both simple and package-qualified name;
    /// the first declaration seen under a simple name wins.
    pub fn build(units: &[SourceUnit]) -> Self {
        let mut by_name = HashMap::new();

        for unit in units {
            for decl in &unit.types {
                let qualified = decl.qualified_name();
                if qualified != decl.name {
                    by_name.entry(qualified).or_insert_with(|| decl.clone());
                }
                match by_name.entry(decl.name.clone()) {
                    std::collections::hash_map::Entry::Occupied(_) => {
                        debug!("Duplicate simple type name, keeping first: {}", decl.name);
                    }
                    std::collections::hash_map::Entry::Vacant(slot) => {
                        slot.insert(decl.clone());
                    }
                }
            }
        }

        Self { by_name }
    }

    /// Resolve a simple or package-qualified type name to its declaration
    pub fn resolve_declaration(&self, name: &str) -> Option<&TypeDecl> {
        if let Some(decl) = self.by_name.get(name) {
            return Some(decl);
        }
        let simple = name.rsplit('.').next()?;
        self.by_name.get(simple)
    }

    /// All resolvable ancestors of a declaration, nearest first, following
    /// `extends` chains through the index. The universal root type is never
    /// included; inheritance cycles terminate.
    pub fn ancestors_of(&self, decl: &TypeDecl) -> Vec<&TypeDecl> {
        let mut ancestors = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(decl.qualified_name());

        let mut frontier: VecDeque<String> =
            decl.extends.iter().map(|t| t.name.clone()).collect();

        while let Some(name) = frontier.pop_front() {
            if name == "Object" || name.ends_with(".Object") {
                continue;
            }
            let Some(ancestor) = self.resolve_declaration(&name) else {
                continue;
            };
            if !visited.insert(ancestor.qualified_name()) {
                continue;
            }
            frontier.extend(ancestor.extends.iter().map(|t| t.name.clone()));
            ancestors.push(ancestor);
        }

        ancestors
    }
}
