//! Scope strings and role presets known to the console.
//!
//! Scopes are formatted `service:Action` (e.g. `s3:GetObject`,
//! `admin:ListUsers`). The wildcard scopes `s3:*` and `admin:*` stand in for
//! every action of their service during evaluation.

use serde::{Deserialize, Serialize};

/// Universal resource key: grants recorded under it apply to every resource.
pub const ALL_RESOURCES: &str = "arn:aws:s3:::*";

/// Pseudo-resource the console uses for actions that target no bucket
/// (server info, user listings, and the like).
pub const CONSOLE_UI_RESOURCE: &str = "console-ui";

pub const S3_ALL_ACTIONS: &str = "s3:*";
pub const ADMIN_ALL_ACTIONS: &str = "admin:*";

pub const S3_LIST_BUCKET: &str = "s3:ListBucket";
pub const S3_LIST_ALL_MY_BUCKETS: &str = "s3:ListAllMyBuckets";
pub const S3_GET_BUCKET_LOCATION: &str = "s3:GetBucketLocation";
pub const S3_HEAD_BUCKET: &str = "s3:HeadBucket";
pub const S3_CREATE_BUCKET: &str = "s3:CreateBucket";
pub const S3_DELETE_BUCKET: &str = "s3:DeleteBucket";
pub const S3_FORCE_DELETE_BUCKET: &str = "s3:ForceDeleteBucket";
pub const S3_GET_OBJECT: &str = "s3:GetObject";
pub const S3_PUT_OBJECT: &str = "s3:PutObject";
pub const S3_DELETE_OBJECT: &str = "s3:DeleteObject";
pub const S3_GET_OBJECT_TAGGING: &str = "s3:GetObjectTagging";
pub const S3_PUT_OBJECT_TAGGING: &str = "s3:PutObjectTagging";
pub const S3_GET_OBJECT_RETENTION: &str = "s3:GetObjectRetention";
pub const S3_PUT_OBJECT_RETENTION: &str = "s3:PutObjectRetention";
pub const S3_GET_OBJECT_LEGAL_HOLD: &str = "s3:GetObjectLegalHold";
pub const S3_PUT_OBJECT_LEGAL_HOLD: &str = "s3:PutObjectLegalHold";
pub const S3_GET_BUCKET_POLICY: &str = "s3:GetBucketPolicy";
pub const S3_PUT_BUCKET_POLICY: &str = "s3:PutBucketPolicy";
pub const S3_DELETE_BUCKET_POLICY: &str = "s3:DeleteBucketPolicy";
pub const S3_GET_BUCKET_VERSIONING: &str = "s3:GetBucketVersioning";
pub const S3_PUT_BUCKET_VERSIONING: &str = "s3:PutBucketVersioning";
pub const S3_GET_BUCKET_NOTIFICATIONS: &str = "s3:GetBucketNotification";
pub const S3_PUT_BUCKET_NOTIFICATIONS: &str = "s3:PutBucketNotification";
pub const S3_GET_BUCKET_TAGGING: &str = "s3:GetBucketTagging";
pub const S3_PUT_BUCKET_TAGGING: &str = "s3:PutBucketTagging";
pub const S3_GET_LIFECYCLE_CONFIGURATION: &str = "s3:GetLifecycleConfiguration";
pub const S3_PUT_LIFECYCLE_CONFIGURATION: &str = "s3:PutLifecycleConfiguration";
pub const S3_GET_REPLICATION_CONFIGURATION: &str = "s3:GetReplicationConfiguration";
pub const S3_PUT_REPLICATION_CONFIGURATION: &str = "s3:PutReplicationConfiguration";
pub const S3_GET_ENCRYPTION_CONFIGURATION: &str = "s3:GetEncryptionConfiguration";
pub const S3_PUT_ENCRYPTION_CONFIGURATION: &str = "s3:PutEncryptionConfiguration";
pub const S3_LIST_MULTIPART_UPLOAD_PARTS: &str = "s3:ListMultipartUploadParts";
pub const S3_LISTEN_BUCKET_NOTIFICATIONS: &str = "s3:ListenBucketNotification";

pub const ADMIN_LIST_USERS: &str = "admin:ListUsers";
pub const ADMIN_LIST_GROUPS: &str = "admin:ListGroups";
pub const ADMIN_GET_POLICY: &str = "admin:GetPolicy";
pub const ADMIN_LIST_USER_POLICIES: &str = "admin:ListUserPolicies";
pub const ADMIN_SERVER_INFO: &str = "admin:ServerInfo";
pub const ADMIN_GET_BUCKET_QUOTA: &str = "admin:GetBucketQuota";
pub const ADMIN_SET_BUCKET_QUOTA: &str = "admin:SetBucketQuota";

/// Console roles, in increasing order of capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleRole {
    Viewer,
    Editor,
    Owner,
    Admin,
}

impl ConsoleRole {
    /// Default scope set granted to a session holding this role.
    pub fn scopes(&self) -> Vec<&'static str> {
        match self {
            ConsoleRole::Viewer => vec![
                S3_LIST_BUCKET,
                S3_LIST_ALL_MY_BUCKETS,
                S3_GET_BUCKET_LOCATION,
                S3_HEAD_BUCKET,
                S3_GET_OBJECT,
                S3_GET_OBJECT_TAGGING,
                S3_GET_BUCKET_TAGGING,
            ],
            ConsoleRole::Editor => {
                let mut scopes = ConsoleRole::Viewer.scopes();
                scopes.extend([
                    S3_PUT_OBJECT,
                    S3_DELETE_OBJECT,
                    S3_PUT_OBJECT_TAGGING,
                    S3_LIST_MULTIPART_UPLOAD_PARTS,
                ]);
                scopes
            }
            ConsoleRole::Owner => {
                let mut scopes = ConsoleRole::Editor.scopes();
                scopes.extend([
                    S3_CREATE_BUCKET,
                    S3_DELETE_BUCKET,
                    S3_GET_BUCKET_POLICY,
                    S3_PUT_BUCKET_POLICY,
                    S3_DELETE_BUCKET_POLICY,
                    S3_GET_BUCKET_VERSIONING,
                    S3_PUT_BUCKET_VERSIONING,
                    S3_PUT_BUCKET_TAGGING,
                    S3_GET_LIFECYCLE_CONFIGURATION,
                    S3_PUT_LIFECYCLE_CONFIGURATION,
                    S3_GET_BUCKET_NOTIFICATIONS,
                    S3_PUT_BUCKET_NOTIFICATIONS,
                ]);
                scopes
            }
            ConsoleRole::Admin => vec![S3_ALL_ACTIONS, ADMIN_ALL_ACTIONS],
        }
    }
}

impl std::fmt::Display for ConsoleRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConsoleRole::Viewer => "viewer",
            ConsoleRole::Editor => "editor",
            ConsoleRole::Owner => "owner",
            ConsoleRole::Admin => "admin",
        };
        write!(f, "{name}")
    }
}
