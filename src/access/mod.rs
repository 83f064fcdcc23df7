//! Grant-map evaluation for console actions.
//!
//! A session carries an immutable [`GrantMap`] snapshot (resource key ->
//! granted scopes) compiled from IAM-style policy documents. The evaluator in
//! [`evaluator`] answers whether that snapshot authorizes a set of required
//! scopes on one or more resources, honoring wildcard resource keys and the
//! `s3:*` / `admin:*` scope shortcuts.

pub mod errors;
pub mod evaluator;
pub mod loader;
pub mod matcher;
pub mod policy;
pub mod scopes;
pub mod types;

pub use evaluator::{has_access_to_resource, has_permission};
pub use types::{GrantMap, PermissionResource, ResourceQuery};
