//! Public token contract consumed by API clients.
//!
//! `Provider` is what configuration builds; clients only rely on the
//! `TokenProvider` trait.

use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::cache::token::IssuedToken;
use crate::cache::token_cache::TokenCache;
use crate::config::types::ProviderConfig;
use crate::errors::TokenError;
use crate::exchange::TokenExchanger;
use crate::sources::external::ExternalTokenProvider;
use crate::sources::gcp::GcpMetadataSource;
use crate::sources::metadata::AwsMetadataSource;
use crate::sources::static_keys::StaticKeys;
use crate::sources::CredentialSource;

pub trait TokenProvider: Send + Sync {
    /// Bearer token for the `Authorization` header, refreshed when stale.
    fn token(&self) -> impl Future<Output = Result<String, TokenError>> + Send;

    /// Cloud account the credentials belong to.
    fn account_id(&self) -> impl Future<Output = Result<String, TokenError>> + Send;

    fn authorization(&self) -> impl Future<Output = Result<String, TokenError>> + Send {
        async move { Ok(format!("Bearer {}", self.token().await?)) }
    }
}

/// Provider backed by a credential source and the issuer, with lazy refresh.
#[derive(Debug)]
pub struct ExchangeTokenProvider {
    source: CredentialSource,
    exchanger: TokenExchanger,
    cache: TokenCache,
}

impl ExchangeTokenProvider {
    pub fn new(source: CredentialSource, exchanger: TokenExchanger) -> Self {
        Self { source, exchanger, cache: TokenCache::new() }
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    #[instrument(name = "current_token", skip_all, fields(source = self.source.name()))]
    async fn current(&self) -> Result<Arc<IssuedToken>, TokenError> {
        self.cache
            .get_or_refresh(|| async {
                let material = self.source.obtain().await?;
                self.exchanger.exchange(&material).await
            })
            .await
    }
}

impl TokenProvider for ExchangeTokenProvider {
    async fn token(&self) -> Result<String, TokenError> {
        debug!("entering token");
        let token = self.current().await?;
        Ok(token.token.clone())
    }

    async fn account_id(&self) -> Result<String, TokenError> {
        debug!("entering account_id");
        let token = self.current().await?;
        let claim = self.source.account_claim();
        let account_id = claim.read(&token.claims.data);
        if account_id.is_empty() {
            return Err(TokenError::MissingClaim(claim.field_name()));
        }
        Ok(account_id.to_owned())
    }
}

impl TokenProvider for ExternalTokenProvider {
    async fn token(&self) -> Result<String, TokenError> {
        ExternalTokenProvider::token(self)
    }

    async fn account_id(&self) -> Result<String, TokenError> {
        ExternalTokenProvider::account_id(self)
    }
}

#[derive(Debug)]
pub enum Provider {
    Exchange(ExchangeTokenProvider),
    External(ExternalTokenProvider),
}

impl Provider {
    /// Builds the provider described by `config`. `api` is required for every
    /// variant that talks to the issuer; `client` is shared, not copied.
    pub fn from_config(api: Option<&str>, config: &ProviderConfig, client: &Client) -> Result<Self, TokenError> {
        let source = match config {
            ProviderConfig::External { token } => {
                return Ok(Provider::External(ExternalTokenProvider::new(token.as_deref())?));
            }
            ProviderConfig::AwsStatic { access_key_id, secret_access_key, session_token } => {
                CredentialSource::StaticKeys(StaticKeys::new(
                    access_key_id.as_str(),
                    secret_access_key.as_str(),
                    session_token.as_str(),
                )?)
            }
            ProviderConfig::AwsMetadata { endpoint, token_ttl_seconds } => CredentialSource::AwsMetadata(
                AwsMetadataSource::new(client.clone(), endpoint, *token_ttl_seconds),
            ),
            ProviderConfig::GcpMetadata { endpoint, audience } => {
                CredentialSource::GcpMetadata(GcpMetadataSource::new(client.clone(), endpoint, audience))
            }
        };

        let api = api
            .filter(|api| !api.is_empty())
            .ok_or_else(|| TokenError::Configuration("attribute API is required".to_owned()))?;

        debug!(source = source.name(), api = %api, "provider built");
        Ok(Provider::Exchange(ExchangeTokenProvider::new(
            source,
            TokenExchanger::new(client.clone(), api),
        )))
    }
}

impl TokenProvider for Provider {
    async fn token(&self) -> Result<String, TokenError> {
        match self {
            Provider::Exchange(p) => p.token().await,
            Provider::External(p) => TokenProvider::token(p).await,
        }
    }

    async fn account_id(&self) -> Result<String, TokenError> {
        match self {
            Provider::Exchange(p) => p.account_id().await,
            Provider::External(p) => TokenProvider::account_id(p).await,
        }
    }
}
