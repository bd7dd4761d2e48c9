use reqwest::Client;
use tracing::{debug, instrument};

use crate::errors::TokenError;
use crate::observability::metrics::get_metrics;
use crate::sources::{read_metadata_body, ExchangeMaterial, ExchangeMetadata, Realm};
use crate::utils::constants::{GCP_IDENTITY_PATH, GCP_METADATA_FLAVOR_HEADER};

/// Fetches the instance service account identity token from the GCP metadata
/// server. The raw token is the whole exchange material.
#[derive(Debug, Clone)]
pub struct GcpMetadataSource {
    client: Client,
    endpoint: String,
    audience: String,
}

impl GcpMetadataSource {
    pub fn new(client: Client, endpoint: &str, audience: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            audience: audience.to_owned(),
        }
    }

    #[instrument(name = "gcp_metadata_obtain", skip_all, fields(audience = %self.audience))]
    pub async fn obtain(&self) -> Result<ExchangeMaterial, TokenError> {
        debug!("requesting identity token");
        get_metrics().await.metadata_requests.with_label_values(&["gcp", "identity"]).inc();

        let url = format!("{}{}", self.endpoint, GCP_IDENTITY_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("audience", self.audience.as_str()), ("format", "full")])
            .header(GCP_METADATA_FLAVOR_HEADER, "Google")
            .send()
            .await?;
        let body = read_metadata_body(response).await?;

        let token = body.trim();
        if token.is_empty() {
            return Err(TokenError::Metadata { status: 200, body: "empty identity token".to_owned() });
        }

        Ok(ExchangeMaterial {
            realm: Realm::GcpIdentityToken,
            metadata: ExchangeMetadata::IdentityToken { token: token.to_owned() },
        })
    }
}
