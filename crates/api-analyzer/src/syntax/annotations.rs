//! Annotation inspection
//!
//! Read-only attribute lookup over the annotations captured by the front
//! end. String literal values are unquoted and trimmed here; callers see
//! clean attribute text.

/// One annotation as spelled on a declaration
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Name as written, possibly package-qualified
    pub name: String,
    /// Single positional value, raw source text
    pub positional: Option<String>,
    /// Named attributes in source order, raw source text values
    pub attributes: Vec<(String, String)>,
}

impl Annotation {
    /// Unqualified annotation name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// The annotations of one declaration
#[derive(Debug, Clone, Default)]
pub struct Annotations(pub Vec<Annotation>);

impl Annotations {
    /// Find an annotation by simple name; fully-qualified spellings match.
    pub fn get(&self, name: &str) -> Option<&Annotation> {
        self.0.iter().find(|a| a.simple_name() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has(n))
    }

    /// Exact named-attribute lookup, no fallbacks
    pub fn named(&self, name: &str, attribute: &str) -> Option<String> {
        let annotation = self.get(name)?;
        annotation
            .attributes
            .iter()
            .find(|(k, _)| k == attribute)
            .map(|(_, v)| unquote(v))
    }

    /// Attribute lookup with the documented fallback chain: exact named
    /// match first; for `value`/`path` queries a single positional value
    /// also satisfies the query, and each falls back to the other named
    /// attribute when the requested one is absent.
    pub fn value_of(&self, name: &str, attribute: &str) -> Option<String> {
        if let Some(v) = self.named(name, attribute) {
            return Some(v);
        }

        let other = match attribute {
            "value" => "path",
            "path" => "value",
            _ => return None,
        };

        self.get(name)
            .and_then(|a| a.positional.as_deref().map(unquote))
            .or_else(|| self.named(name, other))
    }

    /// The single positional value, or the named `value` attribute
    pub fn single_value_of(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(|a| a.positional.as_deref().map(unquote))
            .or_else(|| self.named(name, "value"))
    }
}

/// Trim an attribute expression and strip one pair of surrounding quotes
fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
