//! Configuration validation with aggregated errors.
//! Every problem is collected into a `Vec<String>` so one run reports them all:
//!   * api presence for providers that talk to the issuer
//!   * static key completeness
//!   * metadata endpoints and session token TTL
//!   * logging level

use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::{ProviderConfig, ServiceConfig};
use crate::utils::constants::AWS_METADATA_TOKEN_TTL_SECONDS;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if cfg.provider.requires_api() {
        match cfg.api.as_deref().map(str::trim) {
            None | Some("") => errors.push(format!(
                "config: 'api' is required for provider '{}'",
                cfg.provider.type_name()
            )),
            Some(api) => validate_url("api", api, &mut errors),
        }
    }

    validate_provider(&cfg.provider, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
    if settings.http.timeout_ms == Some(0) {
        errors.push("settings.http.timeout_ms must be greater than 0".to_string());
    }
}

fn validate_provider(provider: &ProviderConfig, errors: &mut Vec<String>) {
    match provider {
        ProviderConfig::AwsStatic { access_key_id, secret_access_key, session_token } => {
            for (name, value) in [
                ("access_key_id", access_key_id),
                ("secret_access_key", secret_access_key),
                ("session_token", session_token),
            ] {
                if value.trim().is_empty() {
                    errors.push(format!("provider.{} is required for aws_static", name));
                }
            }
        }
        ProviderConfig::AwsMetadata { endpoint, token_ttl_seconds } => {
            validate_url("provider.endpoint", endpoint, errors);
            if *token_ttl_seconds == 0 || *token_ttl_seconds > AWS_METADATA_TOKEN_TTL_SECONDS {
                errors.push(format!(
                    "provider.token_ttl_seconds must be within 1..={}, got {}",
                    AWS_METADATA_TOKEN_TTL_SECONDS, token_ttl_seconds
                ));
            }
        }
        ProviderConfig::GcpMetadata { endpoint, audience } => {
            validate_url("provider.endpoint", endpoint, errors);
            if audience.trim().is_empty() {
                errors.push("provider.audience must not be empty".to_string());
            }
        }
        ProviderConfig::External { .. } => {}
    }
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<String>) {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(format!("{} '{}' must start with http:// or https://", field, value));
    }
}
