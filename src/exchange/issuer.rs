use http::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::token::IssuedToken;
use crate::errors::{ApiError, TokenError};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::sources::{ExchangeMaterial, ExchangeMetadata, Realm};
use crate::utils::constants::{ISSUE_PATH, TOKEN_QUOTA, TOKEN_VALIDITY};

#[derive(Debug, Serialize)]
struct IssueRequest<'a> {
    realm: Realm,
    validity: &'static str,
    quota: u32,
    metadata: &'a ExchangeMetadata,
}

/// Exchanges credential material for a bearer token at `<api>/issue`.
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    client: Client,
    issue_url: String,
}

impl TokenExchanger {
    pub fn new(client: Client, api: &str) -> Self {
        Self {
            client,
            issue_url: format!("{}{}", api.trim_end_matches('/'), ISSUE_PATH),
        }
    }

    pub fn issue_url(&self) -> &str {
        &self.issue_url
    }

    #[instrument(name = "exchange", skip_all, fields(realm = %material.realm))]
    pub async fn exchange(&self, material: &ExchangeMaterial) -> Result<IssuedToken, TokenError> {
        let metrics = get_metrics().await;
        let realm = material.realm.as_str();
        let start = get_instant();
        metrics.exchange_requests.with_label_values(&[realm]).inc();

        let result = self.issue(material).await;

        metrics.exchange_duration.with_label_values(&[realm]).observe(start.elapsed().as_secs_f64());
        match &result {
            Ok(token) => info!(exp = token.claims.exp, "token issued"),
            Err(e) => {
                warn!("token exchange failed: {}", e);
                metrics.exchange_failures.with_label_values(&[realm, failure_reason(e)]).inc();
            }
        }
        result
    }

    async fn issue(&self, material: &ExchangeMaterial) -> Result<IssuedToken, TokenError> {
        let body = IssueRequest {
            realm: material.realm,
            validity: TOKEN_VALIDITY,
            quota: TOKEN_QUOTA,
            metadata: &material.metadata,
        };

        debug!(url = %self.issue_url, "requesting token");
        let response = self
            .client
            .post(&self.issue_url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        if status != 200 {
            return Err(TokenError::Issuer(ApiError::from_response(status, &bytes)));
        }

        let token: IssuedToken = serde_json::from_slice(&bytes)?;
        if token.token.is_empty() {
            return Err(TokenError::Decode("issue response carries no token".to_owned()));
        }
        if token.is_expired() {
            return Err(TokenError::Expired { exp: token.claims.exp });
        }
        Ok(token)
    }
}

fn failure_reason(err: &TokenError) -> &'static str {
    match err {
        TokenError::Transport(_) => "transport",
        TokenError::Issuer(_) => "issuer",
        TokenError::Decode(_) => "decode",
        TokenError::Expired { .. } => "expired",
        _ => "other",
    }
}
