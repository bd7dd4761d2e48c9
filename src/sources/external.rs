use std::env;
use std::fmt;

use tracing::{debug, instrument};

use crate::cache::token::Claims;
use crate::errors::TokenError;
use crate::helpers::time::is_expired;
use crate::parser::jwt::decode_claims;
use crate::utils::constants::EXTERNAL_TOKEN_ENVS;

/// Serves a bearer token issued out-of-band. Nothing is exchanged and nothing
/// is refreshed: once the token expires every call fails.
#[derive(Clone)]
pub struct ExternalTokenProvider {
    token_string: String,
    claims: Claims,
}

impl ExternalTokenProvider {
    /// Uses `token` when given, otherwise the first non-empty variable of
    /// `PRISMA_TOKEN`, `APOCTL_TOKEN`, `ENFORCERD_TOKEN`.
    pub fn new(token: Option<&str>) -> Result<Self, TokenError> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            debug!("token set in config");
            return Self::from_token(token);
        }

        debug!("token not set in config, will attempt to find in env var");
        let token = token_from_env().ok_or_else(|| {
            TokenError::Configuration(format!(
                "token not set in config or found in env vars {}",
                EXTERNAL_TOKEN_ENVS.join(", ")
            ))
        })?;
        Self::from_token(&token)
    }

    pub fn from_env() -> Result<Self, TokenError> {
        Self::new(None)
    }

    fn from_token(token: &str) -> Result<Self, TokenError> {
        let claims = decode_claims(token)?;
        Ok(Self { token_string: token.to_owned(), claims })
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    #[instrument(name = "external_token", skip_all)]
    pub fn token(&self) -> Result<String, TokenError> {
        if is_expired(self.claims.exp) {
            debug!(exp = self.claims.exp, "external token is expired");
            return Err(TokenError::Expired { exp: self.claims.exp });
        }
        Ok(self.token_string.clone())
    }

    /// Tokens obtained out-of-band carry no reliable account claim.
    pub fn account_id(&self) -> Result<String, TokenError> {
        Err(TokenError::Unsupported("account ID is not available for externally supplied tokens"))
    }
}

impl fmt::Debug for ExternalTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalTokenProvider")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

fn token_from_env() -> Option<String> {
    let found = EXTERNAL_TOKEN_ENVS.iter().find_map(|name| {
        env::var(name)
            .ok()
            .filter(|value| !value.is_empty())
            .inspect(|_| debug!("got token from env var {}", name))
    });
    if found.is_none() {
        debug!("token not found in env vars {:?}", EXTERNAL_TOKEN_ENVS);
    }
    found
}
