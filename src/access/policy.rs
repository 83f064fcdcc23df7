//! IAM-style policy documents.
//!
//! The console backend derives each session's grant map from the policy
//! documents attached to the account. Documents are JSON with a `Version`
//! and a list of statements; `Action` and `Resource` accept a single string
//! or an array of strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "Statement", default)]
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Action", with = "one_or_many", default)]
    pub actions: Vec<String>,
    #[serde(rename = "Resource", with = "one_or_many", default)]
    pub resources: Vec<String>,
    /// Condition operator -> condition values, e.g.
    /// `{"StringEquals": {"s3:prefix": ["invoices/"]}}`.
    #[serde(rename = "Condition", default, skip_serializing_if = "HashMap::is_empty")]
    pub conditions: HashMap<String, ConditionValues>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Values under one condition operator. Only `s3:prefix` is interpreted;
/// other condition keys are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionValues {
    #[serde(rename = "s3:prefix", with = "one_or_many", default)]
    pub s3_prefix: Vec<String>,
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

/// Serde adapter for IAM's one-string-or-array fields.
mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => Ok(vec![value]),
            OneOrMany::Many(values) => Ok(values),
        }
    }

    pub fn serialize<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        values.serialize(serializer)
    }
}

/// Parse a policy document from JSON text.
pub fn parse_policy_document(source: &str) -> Result<PolicyDocument, serde_json::Error> {
    serde_json::from_str(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = parse_policy_document(
            r#"{
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Allow",
                        "Action": ["s3:GetObject", "s3:ListBucket"],
                        "Resource": "arn:aws:s3:::reports"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.version, "2012-10-17");
        assert_eq!(doc.statements.len(), 1);
        let stmt = &doc.statements[0];
        assert_eq!(stmt.effect, Effect::Allow);
        assert_eq!(stmt.actions, ["s3:GetObject", "s3:ListBucket"]);
        assert_eq!(stmt.resources, ["arn:aws:s3:::reports"]);
        assert!(stmt.conditions.is_empty());
    }

    #[test]
    fn test_parse_single_string_action_and_resource() {
        let doc = parse_policy_document(
            r#"{
                "Version": "2012-10-17",
                "Statement": [
                    {"Effect": "Deny", "Action": "s3:DeleteObject", "Resource": "arn:aws:s3:::reports"}
                ]
            }"#,
        )
        .unwrap();

        let stmt = &doc.statements[0];
        assert_eq!(stmt.effect, Effect::Deny);
        assert_eq!(stmt.actions, ["s3:DeleteObject"]);
    }

    #[test]
    fn test_parse_prefix_condition() {
        let doc = parse_policy_document(
            r#"{
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Allow",
                        "Action": ["s3:ListBucket"],
                        "Resource": ["arn:aws:s3:::reports"],
                        "Condition": {
                            "StringEquals": {"s3:prefix": ["invoices/", "receipts/"]}
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        let conditions = &doc.statements[0].conditions;
        assert_eq!(
            conditions["StringEquals"].s3_prefix,
            ["invoices/", "receipts/"]
        );
    }

    #[test]
    fn test_parse_unknown_condition_keys_carried_through() {
        let doc = parse_policy_document(
            r#"{
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Allow",
                        "Action": "s3:GetObject",
                        "Resource": "arn:aws:s3:::reports",
                        "Condition": {
                            "StringLike": {"aws:username": "report-*"}
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        let values = &doc.statements[0].conditions["StringLike"];
        assert!(values.s3_prefix.is_empty());
        assert!(values.other.contains_key("aws:username"));
    }

    #[test]
    fn test_parse_rejects_bad_effect() {
        let err = parse_policy_document(
            r#"{"Version": "1", "Statement": [{"Effect": "Maybe", "Action": [], "Resource": []}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Maybe") || err.is_data());
    }
}
