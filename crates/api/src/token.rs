use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A value that is either known at build time or only assigned once the
/// declared resources have actually been deployed.
///
/// Deferred variants carry the resolution path (logical id, attribute)
/// instead of pretending to be strings. Literals serialize as plain JSON
/// strings; deferred variants serialize as single-key intrinsic maps.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Token {
    /// Resolved at build time.
    Literal(String),
    /// Deferred reference to a parameter or resource, `{"Ref": target}`.
    Ref {
        #[serde(rename = "Ref")]
        target: String,
    },
    /// Deferred resource attribute, `{"Fn::GetAtt": [id, attribute]}`.
    GetAtt {
        #[serde(rename = "Fn::GetAtt")]
        parts: (String, String),
    },
}

impl Token {
    pub fn literal(value: impl Into<String>) -> Self {
        Token::Literal(value.into())
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Token::Ref {
            target: target.into(),
        }
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Token::GetAtt {
            parts: (logical_id.into(), attribute.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Token::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_serializes_as_plain_string() {
        let token = Token::literal("my-bucket");
        assert_eq!(serde_json::to_value(&token).unwrap(), json!("my-bucket"));
        assert!(token.is_resolved());
        assert_eq!(token.as_literal(), Some("my-bucket"));
    }

    #[test]
    fn reference_serializes_as_ref_map() {
        let token = Token::reference("StagingBucket");
        assert_eq!(
            serde_json::to_value(&token).unwrap(),
            json!({ "Ref": "StagingBucket" })
        );
        assert!(!token.is_resolved());
        assert_eq!(token.as_literal(), None);
    }

    #[test]
    fn get_att_serializes_as_intrinsic() {
        let token = Token::get_att("MyRole", "Arn");
        assert_eq!(
            serde_json::to_value(&token).unwrap(),
            json!({ "Fn::GetAtt": ["MyRole", "Arn"] })
        );
    }

    #[test]
    fn round_trips_through_json() {
        for token in [
            Token::literal("abc"),
            Token::reference("P"),
            Token::get_att("R", "Arn"),
        ] {
            let encoded = serde_json::to_string(&token).unwrap();
            let decoded: Token = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, token);
        }
    }
}
