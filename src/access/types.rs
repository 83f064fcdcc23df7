use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Immutable snapshot of a session's grants: resource key -> granted scopes.
///
/// Keys are ARN-like strings (`arn:aws:s3:::bucket-name`,
/// `arn:aws:s3:::bucket-name/*`), the universal key `arn:aws:s3:::*`, or the
/// console pseudo-resource. A snapshot is replaced wholesale on login or
/// permission refresh and never mutated during evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantMap(HashMap<String, HashSet<String>>);

impl GrantMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Scopes recorded under `key`, if any. Exact key lookup only; wildcard
    /// interpretation happens in the evaluator.
    pub fn scopes_for(&self, key: &str) -> Option<&HashSet<String>> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Union `scopes` into the set recorded under `resource`.
    pub fn grant<I, S>(&mut self, resource: impl Into<String>, scopes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(resource.into())
            .or_default()
            .extend(scopes.into_iter().map(Into::into));
    }

    /// Remove `scopes` from the set recorded under `resource`, if present.
    pub fn revoke(&mut self, resource: &str, scopes: &HashSet<String>) {
        if let Some(existing) = self.0.get_mut(resource) {
            existing.retain(|scope| !scopes.contains(scope));
        }
    }

    /// Sorted view for API responses and logs.
    pub fn to_sorted(&self) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(key, scopes)| {
                let mut sorted: Vec<String> = scopes.iter().cloned().collect();
                sorted.sort();
                (key.clone(), sorted)
            })
            .collect()
    }
}

impl<K, S, I> FromIterator<(K, I)> for GrantMap
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut map = GrantMap::new();
        for (resource, scopes) in iter {
            map.grant(resource, scopes);
        }
        map
    }
}

/// The resource target of an evaluation: one name or an ordered list
/// (bulk actions check several buckets at once).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceQuery {
    Single(String),
    Many(Vec<String>),
}

impl ResourceQuery {
    /// An empty query never authorizes anything.
    pub fn is_empty(&self) -> bool {
        match self {
            ResourceQuery::Single(name) => name.is_empty(),
            ResourceQuery::Many(names) => names.is_empty(),
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            ResourceQuery::Single(name) => std::slice::from_ref(name),
            ResourceQuery::Many(names) => names,
        }
    }
}

impl From<&str> for ResourceQuery {
    fn from(name: &str) -> Self {
        ResourceQuery::Single(name.to_string())
    }
}

impl From<String> for ResourceQuery {
    fn from(name: String) -> Self {
        ResourceQuery::Single(name)
    }
}

impl From<Vec<String>> for ResourceQuery {
    fn from(names: Vec<String>) -> Self {
        ResourceQuery::Many(names)
    }
}

/// A resource an Allow statement grants access to under a prefix condition,
/// surfaced to the console for nested-prefix browsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResource {
    /// Resource the condition applies to, e.g. `arn:aws:s3:::bucket`.
    pub resource: String,
    /// `s3:prefix` values from the condition block.
    pub prefixes: Vec<String>,
    /// Condition operator, e.g. `StringEquals`.
    pub condition_operator: String,
}

// ---------- API request/response types ----------

#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    /// Names of loaded policy documents to compile into this session's grants.
    pub policies: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub status: String,
    /// Resource key -> granted scopes, sorted for stable output.
    pub permissions: BTreeMap<String, Vec<String>>,
    /// Prefix-conditioned resources from the compiled policies.
    pub allow_resources: Vec<PermissionResource>,
    /// Policy names this session was minted from.
    pub policies: Vec<String>,
    /// Unix timestamp after which the session reads as absent.
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeRequest {
    /// One resource name or a list. Absent or empty fails closed.
    #[serde(default)]
    pub resources: Option<ResourceQuery>,
    /// Precomputed flat scope pool; used instead of `resources` when present.
    #[serde(default)]
    pub granted: Option<Vec<String>>,
    /// Required scopes to check.
    pub scopes: Vec<String>,
    /// All-of (`true`) vs any-of (`false`) over `scopes`.
    #[serde(default)]
    pub match_all: bool,
    /// Also union scopes from every grant key containing the resource ARN.
    #[serde(default)]
    pub contains_resource: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PoliciesResponse {
    pub policies: Vec<String>,
}
