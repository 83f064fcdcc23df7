//! Wildcard grant-key matching.
//!
//! Grant maps can carry keys like `arn:aws:s3:::logs/*` that cover a family
//! of resource names. A rule keeps the final `:`-delimited segment of such a
//! key and matches it against resource names anchored at the end of the name,
//! using plain string comparisons.

use crate::access::scopes::ALL_RESOURCES;

/// A matching rule derived from a grant-map key containing `*`.
///
/// The universal key is not a rule; its scopes apply to every resource and
/// are unioned in unconditionally by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardRule {
    key: String,
    anchor: Anchor,
}

/// Precomputed match form of the key's final path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    /// `foo/*`: the bare stem, or any name with a path component under it.
    Subtree { stem: String, nested: String },
    /// `foo*`: any name containing the stem.
    Prefix(String),
    /// `*foo`: any name ending with the stem.
    Suffix(String),
    /// No leading or trailing `*`; the segment itself as a suffix.
    Literal(String),
}

impl WildcardRule {
    /// Derive a rule from a grant-map key. Keys without a `*` and the
    /// universal key yield no rule.
    pub fn from_key(key: &str) -> Option<Self> {
        if key == ALL_RESOURCES || !key.contains('*') {
            return None;
        }

        let segment = key.rsplit(':').next().unwrap_or(key);
        let anchor = if let Some(stem) = segment.strip_suffix("/*") {
            Anchor::Subtree {
                stem: stem.to_string(),
                nested: format!("{stem}/"),
            }
        } else if let Some(stem) = segment.strip_suffix('*') {
            Anchor::Prefix(stem.to_string())
        } else if let Some(stem) = segment.strip_prefix('*') {
            Anchor::Suffix(stem.to_string())
        } else {
            Anchor::Literal(segment.to_string())
        };

        Some(Self {
            key: key.to_string(),
            anchor,
        })
    }

    /// The grant-map key this rule was derived from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the rule covers `resource`.
    pub fn matches(&self, resource: &str) -> bool {
        if resource.is_empty() {
            return false;
        }
        match &self.anchor {
            Anchor::Subtree { stem, nested } => {
                resource.ends_with(stem.as_str()) || resource.contains(nested.as_str())
            }
            Anchor::Prefix(stem) => resource.contains(stem.as_str()),
            Anchor::Suffix(stem) => resource.ends_with(stem.as_str()),
            Anchor::Literal(segment) => resource.ends_with(segment.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(key: &str) -> WildcardRule {
        WildcardRule::from_key(key).expect("key should yield a rule")
    }

    #[test]
    fn test_no_rule_for_plain_keys() {
        assert!(WildcardRule::from_key("arn:aws:s3:::reports").is_none());
        assert!(WildcardRule::from_key("console-ui").is_none());
    }

    #[test]
    fn test_no_rule_for_universal_key() {
        assert!(WildcardRule::from_key(ALL_RESOURCES).is_none());
    }

    #[test]
    fn test_subtree_matches_stem_and_nested_paths() {
        let r = rule("arn:aws:s3:::logs/*");
        assert!(r.matches("logs"));
        assert!(r.matches("logs/2024"));
        assert!(r.matches("logs/2024/01/records"));
        assert!(!r.matches("other"));
    }

    #[test]
    fn test_subtree_match_is_suffix_anchored() {
        // Anchoring is at the end of the name, not the start.
        let r = rule("arn:aws:s3:::logs/*");
        assert!(r.matches("prod-logs"));
        assert!(!r.matches("logsmore"));
    }

    #[test]
    fn test_trailing_star_matches_containing_names() {
        let r = rule("arn:aws:s3:::backup*");
        assert!(r.matches("backup"));
        assert!(r.matches("backup-2024"));
        assert!(!r.matches("archive"));
    }

    #[test]
    fn test_leading_star_matches_suffix() {
        let r = rule("arn:aws:s3:::*-staging");
        assert!(r.matches("web-staging"));
        assert!(!r.matches("web-prod"));
    }

    #[test]
    fn test_empty_resource_never_matches() {
        let r = rule("arn:aws:s3:::logs/*");
        assert!(!r.matches(""));
    }

    #[test]
    fn test_rule_keeps_original_key() {
        let r = rule("arn:aws:s3:::logs/*");
        assert_eq!(r.key(), "arn:aws:s3:::logs/*");
    }
}
