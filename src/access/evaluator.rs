//! Grant evaluation for console actions.
//!
//! [`has_permission`] decides whether a session's grant map authorizes a set
//! of required scopes on one or more resources. The evaluator is a pure
//! function of its inputs and fails closed: an absent resource, an empty
//! grant map, or an unknown scope yields `false`, never an error.

use std::collections::HashSet;

use crate::access::matcher::WildcardRule;
use crate::access::scopes::{ADMIN_ALL_ACTIONS, ALL_RESOURCES, S3_ALL_ACTIONS};
use crate::access::types::{GrantMap, ResourceQuery};

/// Check whether `grants` authorizes `scopes` on `resources`.
///
/// With `match_all` every required scope must be satisfied; otherwise one
/// suffices. With `contains_resource`, scopes from every grant key containing
/// the resource ARN as a substring are unioned in as well (nested-prefix
/// bucket access).
pub fn has_permission(
    grants: &GrantMap,
    resources: Option<&ResourceQuery>,
    scopes: &[String],
    match_all: bool,
    contains_resource: bool,
) -> bool {
    let Some(query) = resources else {
        return false;
    };
    if query.is_empty() {
        return false;
    }

    let mut pool: HashSet<&str> = HashSet::new();

    // Global grants apply to every resource.
    if let Some(global) = grants.scopes_for(ALL_RESOURCES) {
        pool.extend(global.iter().map(String::as_str));
    }

    let rules: Vec<WildcardRule> = grants
        .keys()
        .filter_map(|key| WildcardRule::from_key(key))
        .collect();

    for name in query.names() {
        for rule in rules.iter().filter(|rule| rule.matches(name)) {
            if let Some(granted) = grants.scopes_for(rule.key()) {
                pool.extend(granted.iter().map(String::as_str));
            }
        }

        // The grant map mixes several ARN suffix conventions for the same
        // bucket; all of them are equally valid hits.
        let bucket_arn = format!("arn:aws:s3:::{name}");
        let object_arn = format!("{bucket_arn}/*");
        let prefix_arn = format!("{bucket_arn}/");
        for key in [
            name.as_str(),
            object_arn.as_str(),
            prefix_arn.as_str(),
            bucket_arn.as_str(),
        ] {
            if let Some(granted) = grants.scopes_for(key) {
                pool.extend(granted.iter().map(String::as_str));
            }
        }

        if contains_resource {
            for key in grants.keys() {
                if !key.contains(bucket_arn.as_str()) {
                    continue;
                }
                if let Some(granted) = grants.scopes_for(key) {
                    pool.extend(granted.iter().map(String::as_str));
                }
            }
        }
    }

    satisfies(&pool, scopes, match_all)
}

/// Lower-level variant for call sites that already resolved the candidate
/// scope pool themselves. An absent pool fails closed.
pub fn has_access_to_resource(
    granted: Option<&[String]>,
    required: &[String],
    match_all: bool,
) -> bool {
    let Some(granted) = granted else {
        return false;
    };
    let pool: HashSet<&str> = granted.iter().map(String::as_str).collect();
    satisfies(&pool, required, match_all)
}

/// Scope satisfaction over the candidate pool. A required scope is satisfied
/// by a literal hit, or by `s3:*` / `admin:*` when it belongs to that service.
fn satisfies(pool: &HashSet<&str>, required: &[String], match_all: bool) -> bool {
    let s3_all = pool.contains(S3_ALL_ACTIONS);
    let admin_all = pool.contains(ADMIN_ALL_ACTIONS);

    let satisfied = required
        .iter()
        .filter(|scope| {
            pool.contains(scope.as_str())
                || (scope.starts_with("s3:") && s3_all)
                || (scope.starts_with("admin:") && admin_all)
        })
        .count();

    // All-of mode compares counts, so zero required scopes is vacuously
    // satisfied there; any-of mode needs at least one hit.
    if match_all {
        satisfied == required.len()
    } else {
        satisfied > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn query(name: &str) -> Option<ResourceQuery> {
        Some(ResourceQuery::from(name))
    }

    #[test]
    fn test_absent_resource_fails_closed() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:GetObject"])]);
        assert!(!has_permission(
            &grants,
            None,
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
    }

    #[test]
    fn test_empty_resource_fails_closed() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:GetObject"])]);
        assert!(!has_permission(
            &grants,
            query("").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
        assert!(!has_permission(
            &grants,
            Some(&ResourceQuery::Many(Vec::new())),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
    }

    #[test]
    fn test_empty_grant_map_fails_closed() {
        let grants = GrantMap::new();
        assert!(!has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
    }

    #[test]
    fn test_unknown_resource_fails_closed() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:GetObject"])]);
        assert!(!has_permission(
            &grants,
            query("archive").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
    }

    #[test]
    fn test_bucket_arn_lookup() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:GetObject"])]);
        assert!(has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
    }

    #[test]
    fn test_all_arn_suffix_conventions_hit() {
        for key in [
            "reports",
            "arn:aws:s3:::reports",
            "arn:aws:s3:::reports/",
            "arn:aws:s3:::reports/*",
        ] {
            let grants = GrantMap::from_iter([(key, ["s3:GetObject"])]);
            assert!(
                has_permission(
                    &grants,
                    query("reports").as_ref(),
                    &scopes(&["s3:GetObject"]),
                    false,
                    false
                ),
                "key {key} should grant access"
            );
        }
    }

    #[test]
    fn test_universal_grants_apply_to_any_resource() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::*", ["admin:ListUsers"])]);
        assert!(has_permission(
            &grants,
            query("anything-at-all").as_ref(),
            &scopes(&["admin:ListUsers"]),
            false,
            false
        ));
    }

    #[test]
    fn test_s3_wildcard_scope_shortcut() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:*"])]);
        assert!(has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
        // s3:* does not satisfy admin scopes.
        assert!(!has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["admin:ListUsers"]),
            false,
            false
        ));
    }

    #[test]
    fn test_admin_wildcard_scope_shortcut() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::*", ["admin:*"])]);
        assert!(has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["admin:ListUsers"]),
            false,
            false
        ));
        assert!(!has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
    }

    #[test]
    fn test_any_vs_all_semantics() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:GetObject"])]);
        let required = scopes(&["s3:GetObject", "s3:PutObject"]);

        assert!(has_permission(
            &grants,
            query("reports").as_ref(),
            &required,
            false,
            false
        ));
        assert!(!has_permission(
            &grants,
            query("reports").as_ref(),
            &required,
            true,
            false
        ));
    }

    #[test]
    fn test_zero_required_scopes_asymmetry() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:GetObject"])]);
        let none: Vec<String> = Vec::new();

        // Any-of with nothing to satisfy fails closed; all-of is vacuously
        // true because zero required equals zero satisfied.
        assert!(!has_permission(
            &grants,
            query("reports").as_ref(),
            &none,
            false,
            false
        ));
        assert!(has_permission(
            &grants,
            query("reports").as_ref(),
            &none,
            true,
            false
        ));
    }

    #[test]
    fn test_resource_list_unions_candidate_scopes() {
        let grants = GrantMap::from_iter([
            ("arn:aws:s3:::reports", vec!["s3:GetObject"]),
            ("arn:aws:s3:::archive", vec!["s3:PutObject"]),
        ]);
        let both = ResourceQuery::Many(vec!["reports".to_string(), "archive".to_string()]);

        // A scope present only under the second resource still counts, and
        // the union satisfies all-of across both.
        assert!(has_permission(
            &grants,
            Some(&both),
            &scopes(&["s3:PutObject"]),
            false,
            false
        ));
        assert!(has_permission(
            &grants,
            Some(&both),
            &scopes(&["s3:GetObject", "s3:PutObject"]),
            true,
            false
        ));
        assert!(!has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["s3:GetObject", "s3:PutObject"]),
            true,
            false
        ));
    }

    #[test]
    fn test_wildcard_resource_rule() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::logs/*", ["s3:GetObject"])]);
        assert!(has_permission(
            &grants,
            query("logs").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
        assert!(has_permission(
            &grants,
            query("logs/2024").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
        assert!(!has_permission(
            &grants,
            query("other").as_ref(),
            &scopes(&["s3:GetObject"]),
            false,
            false
        ));
    }

    #[test]
    fn test_all_matching_wildcard_rules_union() {
        let grants = GrantMap::from_iter([
            ("arn:aws:s3:::logs/*", vec!["s3:GetObject"]),
            ("arn:aws:s3:::logs*", vec!["s3:PutObject"]),
        ]);
        assert!(has_permission(
            &grants,
            query("logs/2024").as_ref(),
            &scopes(&["s3:GetObject", "s3:PutObject"]),
            true,
            false
        ));
    }

    #[test]
    fn test_contains_resource_unions_substring_keys() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::bucket/prefix", ["s3:GetObject"])]);
        let required = scopes(&["s3:GetObject"]);

        assert!(!has_permission(
            &grants,
            query("bucket").as_ref(),
            &required,
            false,
            false
        ));
        assert!(has_permission(
            &grants,
            query("bucket").as_ref(),
            &required,
            false,
            true
        ));
    }

    #[test]
    fn test_evaluation_does_not_mutate_grants() {
        let grants = GrantMap::from_iter([("arn:aws:s3:::reports", ["s3:GetObject"])]);
        let before = grants.clone();
        let _ = has_permission(
            &grants,
            query("reports").as_ref(),
            &scopes(&["s3:GetObject", "admin:ListUsers"]),
            true,
            true,
        );
        assert_eq!(grants, before);
    }

    #[test]
    fn test_has_access_to_resource_absent_pool() {
        assert!(!has_access_to_resource(
            None,
            &scopes(&["s3:GetObject"]),
            false
        ));
    }

    #[test]
    fn test_has_access_to_resource_any_and_all() {
        let granted = scopes(&["s3:GetObject"]);
        let required = scopes(&["s3:GetObject", "s3:PutObject"]);

        assert!(has_access_to_resource(Some(&granted), &required, false));
        assert!(!has_access_to_resource(Some(&granted), &required, true));
    }

    #[test]
    fn test_has_access_to_resource_wildcard_pool() {
        let granted = scopes(&["s3:*"]);
        assert!(has_access_to_resource(
            Some(&granted),
            &scopes(&["s3:DeleteObject"]),
            false
        ));
        assert!(!has_access_to_resource(
            Some(&granted),
            &scopes(&["admin:ListUsers"]),
            false
        ));
    }
}
