//! Sources module
//!
//! Credential sources produce the material the issuer exchanges for a bearer
//! token. The set of variants is closed and chosen at construction time.

use std::fmt;

use reqwest::Response;
use serde::{Serialize, Serializer};

use crate::cache::token::ClaimsData;
use crate::errors::TokenError;
use crate::utils::constants::{REALM_AWS, REALM_GCP};

pub mod external;
pub mod gcp;
pub mod metadata;
pub mod static_keys;

use gcp::GcpMetadataSource;
use metadata::AwsMetadataSource;
use static_keys::StaticKeys;

/// Issuer tag of the exchange protocol; serialized as `as_str()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realm {
    AwsSecurityToken,
    GcpIdentityToken,
}

impl Realm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::AwsSecurityToken => REALM_AWS,
            Realm::GcpIdentityToken => REALM_GCP,
        }
    }
}

impl Serialize for Realm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Realm-specific body of the `metadata` field of an issue request.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExchangeMetadata {
    AwsKeys {
        #[serde(rename = "accessKeyID")]
        access_key_id: String,
        #[serde(rename = "secretAccessKey")]
        secret_access_key: String,
        token: String,
    },
    IdentityToken {
        token: String,
    },
}

impl fmt::Debug for ExchangeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeMetadata::AwsKeys { access_key_id, .. } => f
                .debug_struct("AwsKeys")
                .field("access_key_id", access_key_id)
                .finish_non_exhaustive(),
            ExchangeMetadata::IdentityToken { .. } => f.debug_struct("IdentityToken").finish_non_exhaustive(),
        }
    }
}

/// Built fresh for every exchange attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeMaterial {
    pub realm: Realm,
    pub metadata: ExchangeMetadata,
}

/// Claim of the issued token holding the cloud account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountClaim {
    Organization,
    ProjectNumber,
}

impl AccountClaim {
    pub fn field_name(&self) -> &'static str {
        match self {
            AccountClaim::Organization => "organization",
            AccountClaim::ProjectNumber => "projectnumber",
        }
    }

    pub fn read<'a>(&self, data: &'a ClaimsData) -> &'a str {
        match self {
            AccountClaim::Organization => &data.organization,
            AccountClaim::ProjectNumber => &data.projectnumber,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CredentialSource {
    StaticKeys(StaticKeys),
    AwsMetadata(AwsMetadataSource),
    GcpMetadata(GcpMetadataSource),
}

impl CredentialSource {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::StaticKeys(_) => "aws_static",
            CredentialSource::AwsMetadata(_) => "aws_metadata",
            CredentialSource::GcpMetadata(_) => "gcp_metadata",
        }
    }

    pub fn account_claim(&self) -> AccountClaim {
        match self {
            CredentialSource::StaticKeys(_) | CredentialSource::AwsMetadata(_) => AccountClaim::Organization,
            CredentialSource::GcpMetadata(_) => AccountClaim::ProjectNumber,
        }
    }

    pub async fn obtain(&self) -> Result<ExchangeMaterial, TokenError> {
        match self {
            CredentialSource::StaticKeys(s) => Ok(s.obtain()),
            CredentialSource::AwsMetadata(s) => s.obtain().await,
            CredentialSource::GcpMetadata(s) => s.obtain().await,
        }
    }
}

/// Body of a metadata service response; any non-200 status surfaces the body verbatim.
pub(crate) async fn read_metadata_body(response: Response) -> Result<String, TokenError> {
    let status = response.status();
    let body = response.text().await?;
    if status.as_u16() != 200 {
        return Err(TokenError::Metadata { status: status.as_u16(), body });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realm_serializes_to_issuer_tag() {
        assert_eq!(serde_json::to_value(Realm::AwsSecurityToken).unwrap(), "AWSSecurityToken");
        assert_eq!(serde_json::to_value(Realm::GcpIdentityToken).unwrap(), "GCPIdentityToken");
        assert_eq!(Realm::GcpIdentityToken.to_string(), REALM_GCP);
        for realm in [Realm::AwsSecurityToken, Realm::GcpIdentityToken] {
            assert_eq!(serde_json::to_value(realm).unwrap(), realm.as_str());
        }
    }

    #[test]
    fn account_claim_reads_provider_field() {
        let data = ClaimsData {
            organization: "123456789012".to_owned(),
            projectnumber: "987".to_owned(),
            ..Default::default()
        };
        assert_eq!(AccountClaim::Organization.read(&data), "123456789012");
        assert_eq!(AccountClaim::ProjectNumber.read(&data), "987");
    }

    #[test]
    fn identity_metadata_has_only_token() {
        let metadata = ExchangeMetadata::IdentityToken { token: "id-token".to_owned() };
        assert_eq!(serde_json::to_string(&metadata).unwrap(), r#"{"token":"id-token"}"#);
        assert!(!format!("{:?}", metadata).contains("id-token"));
    }
}
