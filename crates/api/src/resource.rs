//! Shapes of the emitted resources.
//!
//! These are the property maps registered into the resource graph for the
//! provider's execution role and function. Wire casing is PascalCase;
//! optional blocks are omitted entirely when absent rather than emitted
//! empty.

use crate::policy::{InlinePolicy, PolicyDocument};
use crate::token::Token;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Runtime identifiers accepted for provider functions.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    #[serde(rename = "nodejs16.x")]
    NodeJs16,
    #[serde(rename = "nodejs18.x")]
    NodeJs18,
    #[serde(rename = "nodejs20.x")]
    NodeJs20,
    #[serde(rename = "nodejs22.x")]
    NodeJs22,
}

impl Runtime {
    pub fn as_str(self) -> &'static str {
        match self {
            Runtime::NodeJs16 => "nodejs16.x",
            Runtime::NodeJs18 => "nodejs18.x",
            Runtime::NodeJs20 => "nodejs20.x",
            Runtime::NodeJs22 => "nodejs22.x",
        }
    }
}

/// Properties of the execution-role resource.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    pub assume_role_policy_document: PolicyDocument,
    pub managed_policy_arns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<InlinePolicy>>,
}

/// Code location of the function resource.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionCode {
    pub s3_bucket: Token,
    pub s3_key: String,
}

/// Environment block of the function resource.
///
/// Variables serialize in map order, so the provider sorts keys before
/// building this block.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionEnvironment {
    pub variables: IndexMap<String, String>,
}

/// Properties of the function resource.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionProperties {
    pub code: FunctionCode,
    /// Seconds.
    pub timeout: u64,
    /// Mebibytes.
    pub memory_size: u32,
    pub handler: String,
    pub role: Token,
    pub runtime: Runtime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<FunctionEnvironment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
