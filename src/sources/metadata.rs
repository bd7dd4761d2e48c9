use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::errors::TokenError;
use crate::observability::metrics::get_metrics;
use crate::sources::{read_metadata_body, ExchangeMaterial, ExchangeMetadata, Realm};
use crate::utils::constants::{
    AWS_METADATA_ROLE_PATH, AWS_METADATA_TOKEN_HEADER, AWS_METADATA_TOKEN_PATH, AWS_METADATA_TTL_HEADER,
};

const PROVIDER: &str = "aws";

/// Temporary credentials of the instance role, as served by the AWS metadata service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsCredentialDocument {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, rename = "Type")]
    pub credential_type: Option<String>,
    #[serde(default, alias = "accessKeyId")]
    pub access_key_id: String,
    #[serde(default, alias = "secretAccessKey")]
    pub secret_access_key: String,
    #[serde(default, alias = "token")]
    pub token: String,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

/// Obtains role credentials from the AWS instance metadata service (IMDSv2):
/// a session token first, then the role name, then the role's credential document.
#[derive(Debug, Clone)]
pub struct AwsMetadataSource {
    client: Client,
    endpoint: String,
    token_ttl_seconds: u64,
}

impl AwsMetadataSource {
    pub fn new(client: Client, endpoint: &str, token_ttl_seconds: u64) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            token_ttl_seconds,
        }
    }

    #[instrument(name = "aws_metadata_obtain", skip_all)]
    pub async fn obtain(&self) -> Result<ExchangeMaterial, TokenError> {
        let session_token = self.session_token().await?;
        let role = self.role(&session_token).await?;
        let document = self.credentials(&session_token, &role).await?;

        Ok(ExchangeMaterial {
            realm: Realm::AwsSecurityToken,
            metadata: ExchangeMetadata::AwsKeys {
                access_key_id: document.access_key_id,
                secret_access_key: document.secret_access_key,
                token: document.token,
            },
        })
    }

    async fn session_token(&self) -> Result<String, TokenError> {
        debug!("requesting metadata session token");
        get_metrics().await.metadata_requests.with_label_values(&[PROVIDER, "session_token"]).inc();

        let url = format!("{}{}", self.endpoint, AWS_METADATA_TOKEN_PATH);
        let response = self
            .client
            .put(&url)
            .header(AWS_METADATA_TTL_HEADER, self.token_ttl_seconds.to_string())
            .send()
            .await?;

        read_metadata_body(response)
            .await
            .inspect_err(|e| error!("retrieving AWS session token failed: {}", e))
    }

    async fn role(&self, session_token: &str) -> Result<String, TokenError> {
        debug!("requesting instance role name");
        get_metrics().await.metadata_requests.with_label_values(&[PROVIDER, "role"]).inc();

        let url = format!("{}{}", self.endpoint, AWS_METADATA_ROLE_PATH);
        let response = self
            .client
            .get(&url)
            .header(AWS_METADATA_TOKEN_HEADER, session_token)
            .send()
            .await?;
        let body = read_metadata_body(response).await?;

        body.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| TokenError::Metadata {
                status: 200,
                body: "no IAM role attached to this instance".to_owned(),
            })
    }

    async fn credentials(&self, session_token: &str, role: &str) -> Result<AwsCredentialDocument, TokenError> {
        debug!(role = %role, "requesting role credentials");
        get_metrics().await.metadata_requests.with_label_values(&[PROVIDER, "credentials"]).inc();

        let url = format!("{}{}{}", self.endpoint, AWS_METADATA_ROLE_PATH, role);
        let response = self
            .client
            .get(&url)
            .header(http::header::ACCEPT, "application/json")
            .header(AWS_METADATA_TOKEN_HEADER, session_token)
            .send()
            .await?;
        let body = read_metadata_body(response).await?;

        let document: AwsCredentialDocument = serde_json::from_str(&body)?;
        if let Some(code) = document.code.as_deref().filter(|code| *code != "Success") {
            return Err(TokenError::Metadata { status: 200, body: format!("credential document code {}", code) });
        }
        if document.access_key_id.is_empty() || document.secret_access_key.is_empty() || document.token.is_empty() {
            return Err(TokenError::Metadata {
                status: 200,
                body: format!("incomplete credential document for role {}", role),
            });
        }

        debug!(expiration = ?document.expiration, "role credentials received");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_imds_document() {
        let body = r#"{
            "Code" : "Success",
            "LastUpdated" : "2024-05-01T10:00:00Z",
            "Type" : "AWS-HMAC",
            "AccessKeyId" : "ASIA123",
            "SecretAccessKey" : "secret",
            "Token" : "session",
            "Expiration" : "2024-05-01T16:00:00Z"
        }"#;
        let document: AwsCredentialDocument = serde_json::from_str(body).unwrap();

        assert_eq!(document.code.as_deref(), Some("Success"));
        assert_eq!(document.credential_type.as_deref(), Some("AWS-HMAC"));
        assert_eq!(document.access_key_id, "ASIA123");
        assert_eq!(document.token, "session");
        assert!(document.expiration.is_some());
    }

    #[test]
    fn accepts_camel_case_document() {
        let body = r#"{"accessKeyId":"ASIA9","secretAccessKey":"s","token":"t"}"#;
        let document: AwsCredentialDocument = serde_json::from_str(body).unwrap();
        assert_eq!(document.access_key_id, "ASIA9");
        assert_eq!(document.secret_access_key, "s");
        assert_eq!(document.token, "t");
    }
}
