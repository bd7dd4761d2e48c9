use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tracing::debug;

use crate::cache::token::Claims;
use crate::errors::TokenError;

/// Decodes the claim segment of a dot-separated token without verifying its
/// signature.
pub fn decode_claims(token_string: &str) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token_string.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Decode(format!(
            "token must have 3 dot-separated segments, got {}",
            parts.len()
        )));
    }

    let payload = parts[1].trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Decode(format!("base64 decode error: {}", e)))?;

    let claims: Claims = serde_json::from_slice(&decoded)
        .map_err(|e| TokenError::Decode(format!("invalid token payload: {}", e)))?;

    debug!(exp = claims.exp, realm = %claims.realm, "token claims decoded");
    Ok(claims)
}

#[cfg(test)]
pub(crate) fn sample_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"ES256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}
