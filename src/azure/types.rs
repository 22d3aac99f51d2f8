use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope used by every Azure DevOps list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    #[serde(default)]
    #[allow(dead_code)]
    pub count: usize,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub value: Vec<T>,
}

/// Treat both a missing and a `null` array as empty
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// Project types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// Pipeline types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub revision: i32,
    #[serde(default)]
    pub status: Option<String>, // succeeded, failed, anything else is neutral
}

// Release types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>, // active, abandoned, draft
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub environments: Vec<ReleaseEnvironment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEnvironment {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>, // notStarted, inProgress, succeeded, rejected, canceled
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pre_deploy_approvals: Vec<Approval>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: i32,
    #[serde(default)]
    pub approver: Option<IdentityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub unique_name: String,
}
