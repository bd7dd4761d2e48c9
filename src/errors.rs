//! Error taxonomy shared by every provider.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    /// A required construction parameter is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection, DNS or protocol failure reaching the metadata service or the issuer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The instance metadata service answered with a non-200 status.
    #[error("metadata service error: {status}: {body}")]
    Metadata { status: u16, body: String },

    /// The issuing endpoint answered with a non-200 status.
    #[error("issuer error: {0}")]
    Issuer(ApiError),

    /// A response or token could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The token is expired and this provider has no way to mint a new one.
    #[error("token is expired (exp {exp})")]
    Expired { exp: i64 },

    /// The issuer did not populate the claim holding the cloud account ID.
    #[error("unable to get cloud account ID: claim '{0}' is empty")]
    MissingClaim(&'static str),

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired { .. })
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            TokenError::Issuer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(err: serde_json::Error) -> Self {
        TokenError::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ApiErrorData {
    #[serde(default)]
    pub attribute: String,
}

/// One entry of the error envelope returned by the Prisma API.
///
/// Status codes seen in practice: 400 invalid request, 401 unauthenticated,
/// 403 unauthorized, 404 not found, 415 bad content type, 417 token quota
/// exhausted, 422 validation error, 423 locked for maintenance, 429 rate
/// limited, 5xx server or gateway failures.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub trace: String,
    #[serde(default)]
    pub data: ApiErrorData,
}

impl ApiError {
    /// Builds the error from a non-200 response body. The first envelope entry
    /// wins; a body that is not an envelope keeps the HTTP status and raw text.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<Vec<ApiError>>(body) {
            Ok(entries) if !entries.is_empty() => {
                let mut first = entries.into_iter().next().unwrap_or_default();
                if first.code == 0 {
                    first.code = status;
                }
                first
            }
            _ => ApiError {
                code: status,
                description: String::from_utf8_lossy(body).trim().to_owned(),
                ..Default::default()
            },
        }
    }

    pub fn is_forbidden_or_unauthorized(&self) -> bool {
        matches!(self.code, 401 | 403)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == 404
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.description)?;
        if !self.subject.is_empty() {
            write!(f, " (subject: {})", self.subject)?;
        }
        Ok(())
    }
}
