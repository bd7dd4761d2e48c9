use serde::Deserialize;
use std::fmt;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{
    AWS_METADATA_ENDPOINT, AWS_METADATA_TOKEN_TTL_SECONDS, GCP_IDENTITY_AUDIENCE, GCP_METADATA_ENDPOINT,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Base URL of the Prisma API, e.g. `https://api.east-01.network.prismacloud.io`
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub settings: SettingsConfig,
    pub provider: ProviderConfig,
}

/// ================================
/// Credential provider
/// ================================
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    AwsStatic {
        #[serde(default)]
        access_key_id: String,
        #[serde(default)]
        secret_access_key: String,
        #[serde(default)]
        session_token: String,
    },
    AwsMetadata {
        #[serde(default = "default_aws_endpoint")]
        endpoint: String,
        #[serde(default = "default_token_ttl_seconds")]
        token_ttl_seconds: u64,
    },
    GcpMetadata {
        #[serde(default = "default_gcp_endpoint")]
        endpoint: String,
        #[serde(default = "default_audience")]
        audience: String,
    },
    External {
        #[serde(default)]
        token: Option<String>,
    },
}

impl ProviderConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::AwsStatic { .. } => "aws_static",
            ProviderConfig::AwsMetadata { .. } => "aws_metadata",
            ProviderConfig::GcpMetadata { .. } => "gcp_metadata",
            ProviderConfig::External { .. } => "external",
        }
    }

    pub fn requires_api(&self) -> bool {
        !matches!(self, ProviderConfig::External { .. })
    }
}

// secrets stay out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::AwsStatic { access_key_id, .. } => f
                .debug_struct("AwsStatic")
                .field("access_key_id", access_key_id)
                .finish_non_exhaustive(),
            ProviderConfig::AwsMetadata { endpoint, token_ttl_seconds } => f
                .debug_struct("AwsMetadata")
                .field("endpoint", endpoint)
                .field("token_ttl_seconds", token_ttl_seconds)
                .finish(),
            ProviderConfig::GcpMetadata { endpoint, audience } => f
                .debug_struct("GcpMetadata")
                .field("endpoint", endpoint)
                .field("audience", audience)
                .finish(),
            ProviderConfig::External { token } => f
                .debug_struct("External")
                .field("token_set", &token.is_some())
                .finish(),
        }
    }
}

fn default_aws_endpoint() -> String {
    AWS_METADATA_ENDPOINT.to_owned()
}

fn default_token_ttl_seconds() -> u64 {
    AWS_METADATA_TOKEN_TTL_SECONDS
}

fn default_gcp_endpoint() -> String {
    GCP_METADATA_ENDPOINT.to_owned()
}

fn default_audience() -> String {
    GCP_IDENTITY_AUDIENCE.to_owned()
}
