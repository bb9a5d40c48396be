use crate::error::CtpError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical consumer identifier kinds accepted from the caller.
///
/// Each network names these differently on the wire; adapters translate them
/// through a fixed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityType {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "mobilePhone")]
    MobilePhone,
}

impl IdentityType {
    pub const ALL: [IdentityType; 2] = [IdentityType::Email, IdentityType::MobilePhone];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityType::Email => "email",
            IdentityType::MobilePhone => "mobilePhone",
        }
    }
}

impl fmt::Display for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityType {
    type Err = CtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(IdentityType::Email),
            "mobilePhone" => Ok(IdentityType::MobilePhone),
            other => Err(CtpError::UnsupportedIdentityType(other.to_string())),
        }
    }
}

/// A shopper identifier to look up with the card networks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityLookupRequest {
    #[serde(rename = "type")]
    pub identity_type: IdentityType,
    pub value: String,
}

impl IdentityLookupRequest {
    pub fn email(value: impl Into<String>) -> Self {
        Self {
            identity_type: IdentityType::Email,
            value: value.into(),
        }
    }

    pub fn mobile_phone(value: impl Into<String>) -> Self {
        Self {
            identity_type: IdentityType::MobilePhone,
            value: value.into(),
        }
    }
}

/// Network specific form of [`IdentityLookupRequest`], as sent to the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerIdentity {
    pub identity_value: String,
    pub identity_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_types() {
        for identity_type in IdentityType::ALL {
            let parsed: IdentityType = identity_type.as_str().parse().unwrap();
            assert_eq!(parsed, identity_type);
        }
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        let err = "username".parse::<IdentityType>().unwrap_err();
        assert!(matches!(err, CtpError::UnsupportedIdentityType(t) if t == "username"));
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"type":"mobilePhone","value":"+31600000000"}"#;
        let request: IdentityLookupRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request, IdentityLookupRequest::mobile_phone("+31600000000"));

        let bad = r#"{"type":"fax","value":"1"}"#;
        assert!(serde_json::from_str::<IdentityLookupRequest>(bad).is_err());
    }
}
