//! Per-role route grants, matched by method and URL pattern.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The routes one role may call, keyed by upper-case HTTP method.
///
/// Patterns are slash-separated; a `{name}` segment matches exactly one
/// concrete segment, every other segment matches literally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAcl {
    /// Role this grant set belongs to.
    pub role: String,
    /// Method → allowed URL patterns.
    #[serde(default)]
    pub allow: BTreeMap<String, Vec<String>>,
}

impl RouteAcl {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            allow: BTreeMap::new(),
        }
    }

    pub fn grant(mut self, method: &str, patterns: &[&str]) -> Self {
        self.allow
            .entry(method.to_ascii_uppercase())
            .or_default()
            .extend(patterns.iter().map(|p| (*p).to_string()));
        self
    }

    /// Whether this role may call `method` on `path`.
    pub fn allows(&self, method: &str, path: &str) -> bool {
        let Some(patterns) = self.allow.get(&method.to_ascii_uppercase()) else {
            return false;
        };
        patterns.iter().any(|p| pattern_matches(p, path))
    }
}

/// Matches `path` against a route pattern segment by segment.
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    let pattern = pattern.trim_matches('/');
    let path = path.trim_matches('/');
    let mut pattern_segs = pattern.split('/');
    let mut path_segs = path.split('/');
    loop {
        match (pattern_segs.next(), path_segs.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) => {
                let wildcard = p.starts_with('{') && p.ends_with('}');
                if wildcard {
                    if s.is_empty() {
                        return false;
                    }
                } else if p != s {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_segments_match_exactly() {
        assert!(pattern_matches("api/v1/projects", "api/v1/projects"));
        assert!(!pattern_matches("api/v1/projects", "api/v1/profiles"));
    }

    #[test]
    fn placeholder_matches_one_segment() {
        assert!(pattern_matches("api/v1/projects/{id}", "api/v1/projects/42"));
        assert!(!pattern_matches("api/v1/projects/{id}", "api/v1/projects"));
        assert!(!pattern_matches(
            "api/v1/projects/{id}",
            "api/v1/projects/42/claims"
        ));
    }

    #[test]
    fn leading_and_trailing_slashes_are_ignored() {
        assert!(pattern_matches("api/v1/projects", "/api/v1/projects/"));
    }

    #[test]
    fn method_lookup_is_case_insensitive() {
        let acl = RouteAcl::new("standard").grant("get", &["api/v1/projects"]);
        assert!(acl.allows("GET", "api/v1/projects"));
        assert!(!acl.allows("POST", "api/v1/projects"));
    }
}
