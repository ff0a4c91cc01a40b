use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fixed document version marker understood by the deploy-time policy
/// engine.
pub const POLICY_DOCUMENT_VERSION: &str = "2012-10-17";

/// A permission document.
///
/// Statements are opaque to the build: they are carried through verbatim
/// and never validated here.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<serde_json::Value>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<serde_json::Value>) -> Self {
        Self {
            version: POLICY_DOCUMENT_VERSION.to_string(),
            statement,
        }
    }
}

/// A named policy attached inline to a role.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_carries_fixed_version() {
        let doc = PolicyDocument::new(vec![json!({ "Effect": "Allow" })]);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Version"], json!("2012-10-17"));
        assert_eq!(value["Statement"], json!([{ "Effect": "Allow" }]));
    }

    #[test]
    fn statements_pass_through_unvalidated() {
        // Nonsense statements are preserved as-is; validation is a
        // deploy-time concern.
        let doc = PolicyDocument::new(vec![json!({ "NotAStatement": 42 })]);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Statement"][0]["NotAStatement"], json!(42));
    }
}
