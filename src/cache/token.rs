use serde::Deserialize;

use crate::helpers::time::is_expired;

/// Token envelope returned by `POST /issue`.
///
/// Stored behind an `Arc` by the cache and replaced wholesale on refresh, it is
/// never mutated once decoded.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IssuedToken {
    /// Raw bearer string for the `Authorization` header.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub claims: Claims,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub validity: String,
}

impl IssuedToken {
    pub fn is_expired(&self) -> bool {
        is_expired(self.claims.exp)
    }
}

/// Claim set of an issued (or externally supplied) token.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub data: ClaimsData,
}

/// Provider-specific identity attributes. AWS tokens carry the account in
/// `organization`, GCP tokens in `projectnumber`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ClaimsData {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub arn: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub rolename: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub projectid: String,
    #[serde(default)]
    pub projectnumber: String,
    #[serde(default)]
    pub zone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_envelope() {
        let body = r#"{"token":"abc","claims":{"exp":9999999999,"data":{"organization":"acct-123"}}}"#;
        let token: IssuedToken = serde_json::from_str(body).unwrap();

        assert_eq!(token.token, "abc");
        assert_eq!(token.claims.exp, 9_999_999_999);
        assert_eq!(token.claims.data.organization, "acct-123");
        assert!(token.claims.data.projectnumber.is_empty());
        assert!(!token.is_expired());
    }

    #[test]
    fn ignores_unmodelled_fields() {
        let body = r#"{
            "token":"abc",
            "quota":0,
            "restrictedNetworks":[],
            "claims":{"exp":1,"iat":0,"iss":"https://api","sub":"arn:aws:sts::1:assumed-role/x","restrictions":{},
                      "data":{"projectnumber":"42","zone":"us-east1-b","instancename":"vm-1"}}
        }"#;
        let token: IssuedToken = serde_json::from_str(body).unwrap();

        assert_eq!(token.claims.data.projectnumber, "42");
        assert_eq!(token.claims.iss, "https://api");
        assert!(token.is_expired());
    }
}
