// tests/common/mod.rs
pub use serde_json::json;

use httpmock::prelude::*;
use httpmock::Mock;
use reqwest::Client;
use serde_json::Value;

use crate::exchange::TokenExchanger;
use crate::helpers::time::now_i64;
use crate::parser::jwt::sample_jwt;
use crate::provider::ExchangeTokenProvider;
use crate::sources::static_keys::StaticKeys;
use crate::sources::CredentialSource;

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Issuer response body for a token expiring `ttl` seconds from now.
pub fn issue_response(data: Value, ttl: i64, realm: &str) -> Value {
    let claims = json!({
        "exp": now_i64() + ttl,
        "iat": now_i64(),
        "iss": "https://api.example.com",
        "sub": "subject",
        "realm": realm,
        "data": data,
    });
    json!({
        "token": sample_jwt(&claims),
        "claims": claims,
        "realm": realm,
        "validity": "12h",
    })
}

/// Mounts a `POST /issue` answering 200 with `body`.
pub async fn mock_issue<'a>(server: &'a MockServer, body: &Value) -> Mock<'a> {
    let body = body.clone();
    server
        .mock_async(|when, then| {
            when.method(POST).path("/issue");
            then.status(200).header("content-type", "application/json").json_body(body);
        })
        .await
}

pub fn static_keys_provider(client: &Client, api: &str) -> ExchangeTokenProvider {
    let keys = StaticKeys::new("AKIA123", "secret", "session").expect("static keys");
    ExchangeTokenProvider::new(CredentialSource::StaticKeys(keys), TokenExchanger::new(client.clone(), api))
}
