use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::access::errors::AccessError;
use crate::access::policy::{parse_policy_document, Effect, PolicyDocument};
use crate::access::scopes::{ALL_RESOURCES, CONSOLE_UI_RESOURCE};
use crate::access::types::{GrantMap, PermissionResource};

/// Immutable, name-keyed catalog of loaded policy documents. Names are the
/// file stems of the `.json` files in the policies directory.
#[derive(Debug, Default)]
pub struct PolicyCatalog {
    documents: HashMap<String, PolicyDocument>,
}

/// A grant map compiled from one or more policy documents, together with the
/// prefix-conditioned resources surfaced in the session response.
#[derive(Debug, Clone)]
pub struct CompiledGrants {
    pub grants: GrantMap,
    pub allow_resources: Vec<PermissionResource>,
}

impl PolicyCatalog {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PolicyDocument> {
        self.documents.get(name)
    }

    /// Loaded policy names, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.documents.keys().cloned().collect();
        names.sort();
        names
    }

    /// Compile the named policies into a single grant map. Fails on the
    /// first name not present in the catalog.
    pub fn compile(&self, names: &[String]) -> Result<CompiledGrants, AccessError> {
        let mut documents = Vec::with_capacity(names.len());
        for name in names {
            let doc = self
                .documents
                .get(name)
                .ok_or_else(|| AccessError::UnknownPolicy(name.clone()))?;
            documents.push(doc);
        }
        Ok(compile_grants(&documents))
    }
}

/// Load all `.json` policy documents from the given directory into a catalog.
pub fn load_policies(dir: &Path) -> Result<PolicyCatalog, AccessError> {
    if !dir.is_dir() {
        return Err(AccessError::InvalidPoliciesDir(dir.display().to_string()));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "json")
                .unwrap_or(false)
        })
        .collect();
    entries.sort_by_key(|e| e.path());

    let mut documents = HashMap::new();
    for entry in entries {
        let path = entry.path();
        let contents =
            std::fs::read_to_string(&path).map_err(|source| AccessError::PolicyLoadError {
                path: path.display().to_string(),
                source,
            })?;
        let document =
            parse_policy_document(&contents).map_err(|source| AccessError::InvalidPolicy {
                path: path.display().to_string(),
                source,
            })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        documents.insert(name, document);
    }

    let catalog = PolicyCatalog { documents };

    tracing::info!(
        policies = catalog.len(),
        statements = catalog
            .documents
            .values()
            .map(|d| d.statements.len())
            .sum::<usize>(),
        dir = %dir.display(),
        "Loaded policy catalog"
    );

    Ok(catalog)
}

/// Merge the statements of `documents` into a grant map.
///
/// Allow statements union their actions into each named resource, seeded
/// with the default actions from universal-resource allows (which also land
/// under the console pseudo-resource). Deny statements record banned actions
/// per resource and strip them from already-accumulated sets; later allows
/// re-check the banned set before adding.
pub fn compile_grants(documents: &[&PolicyDocument]) -> CompiledGrants {
    let default_actions: HashSet<String> = documents
        .iter()
        .flat_map(|doc| &doc.statements)
        .filter(|stmt| {
            stmt.effect == Effect::Allow
                && stmt
                    .resources
                    .iter()
                    .any(|r| r == ALL_RESOURCES || r == "*")
        })
        .flat_map(|stmt| stmt.actions.iter().cloned())
        .collect();

    let mut grants = GrantMap::new();
    grants.grant(CONSOLE_UI_RESOURCE, default_actions.iter().cloned());

    let mut denied: HashMap<String, HashSet<String>> = HashMap::new();
    let mut allow_resources: Vec<PermissionResource> = Vec::new();

    for statement in documents.iter().flat_map(|doc| &doc.statements) {
        for resource in &statement.resources {
            match statement.effect {
                Effect::Allow => {
                    let banned = denied.get(resource.as_str());
                    let allowed = statement.actions.iter().filter(|action| {
                        banned.map_or(true, |banned| !banned.contains(action.as_str()))
                    });

                    if grants.scopes_for(resource).is_none() {
                        grants.grant(resource.clone(), default_actions.iter().cloned());
                    }
                    grants.grant(resource.clone(), allowed.cloned());

                    for (operator, values) in &statement.conditions {
                        allow_resources.push(PermissionResource {
                            resource: resource.clone(),
                            prefixes: values.s3_prefix.clone(),
                            condition_operator: operator.clone(),
                        });
                    }
                }
                Effect::Deny => {
                    let banned = denied.entry(resource.clone()).or_default();
                    banned.extend(statement.actions.iter().cloned());
                    grants.revoke(resource, banned);
                }
            }
        }
    }

    CompiledGrants {
        grants,
        allow_resources,
    }
}
