use std::env;
use std::fmt;

use tracing::debug;

use crate::errors::TokenError;
use crate::sources::{ExchangeMaterial, ExchangeMetadata, Realm};
use crate::utils::constants::{AWS_ACCESS_KEY_ID_ENV, AWS_SECRET_ACCESS_KEY_ENV, AWS_SESSION_TOKEN_ENV};

/// AWS access key triple supplied up front, typically the short-lived values a
/// Lambda runtime injects into its environment. No network call is needed to
/// obtain exchange material.
#[derive(Clone)]
pub struct StaticKeys {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
}

impl StaticKeys {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let keys = Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
        };

        let mut errors = Vec::new();
        if keys.access_key_id.trim().is_empty() {
            errors.push("attribute accessKeyID is required");
        }
        if keys.secret_access_key.trim().is_empty() {
            errors.push("attribute secretAccessKey is required");
        }
        if keys.session_token.trim().is_empty() {
            errors.push("attribute sessionToken is required");
        }
        if !errors.is_empty() {
            return Err(TokenError::Configuration(errors.join("; ")));
        }

        Ok(keys)
    }

    /// Reads the triple from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Result<Self, TokenError> {
        debug!("reading static AWS keys from env");
        let read = |name: &str| env::var(name).unwrap_or_default();
        Self::new(
            read(AWS_ACCESS_KEY_ID_ENV),
            read(AWS_SECRET_ACCESS_KEY_ENV),
            read(AWS_SESSION_TOKEN_ENV),
        )
    }

    pub fn obtain(&self) -> ExchangeMaterial {
        ExchangeMaterial {
            realm: Realm::AwsSecurityToken,
            metadata: ExchangeMetadata::AwsKeys {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
                token: self.session_token.clone(),
            },
        }
    }
}

impl fmt::Debug for StaticKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeys")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}
