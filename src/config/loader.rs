use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, error};

use crate::config::settings::{LoggingConfig, SettingsConfig};
use crate::config::types::ServiceConfig;
use crate::config::validator;

/// Loads `config_path`; a non-empty `api_override` replaces the file's `api`
/// before validation.
pub async fn run(config_path: &str, api_override: Option<&str>) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    file_to_config(path, api_override)
        .await
        .with_context(|| format!("Invalid config '{}'", config_path))
}

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path, api_override: Option<&str>) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_config_with_api(&content, api_override)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    parse_config_with_api(content, None)
}

pub fn parse_config_with_api(content: &str, api_override: Option<&str>) -> Result<ServiceConfig> {
    let expanded = expand_env_vars(content)?;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&expanded)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply overrides and defaults
    if let Some(api) = api_override.filter(|api| !api.trim().is_empty()) {
        debug!("api overridden from command line");
        service_config.api = Some(api.to_owned());
    }
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validation config ...");
    validator::validate_service_config(&service_config)
        .map_err(|errors| anyhow!("config validation failed: {}", errors.join("; ")))?;

    Ok(service_config)
}

/// Replaces `${VAR}` and `${VAR:default}` with the environment value.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}

/// One transport per loaded configuration; every provider built from it
/// shares the connection pool through `Client` clones.
pub fn build_http_client(settings: &SettingsConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout_ms) = settings.http.timeout_ms {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }
    builder.build().context("Failed to create HTTP client")
}
