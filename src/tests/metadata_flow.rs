// Metadata service flows against httpmock:
//  - AWS IMDSv2 session token -> role -> credentials -> issue
//  - GCP identity token -> issue, account ID from projectnumber

#[cfg(test)]
mod test {

    use httpmock::prelude::*;

    use crate::errors::TokenError;
    use crate::exchange::TokenExchanger;
    use crate::provider::{ExchangeTokenProvider, TokenProvider};
    use crate::sources::gcp::GcpMetadataSource;
    use crate::sources::metadata::AwsMetadataSource;
    use crate::sources::CredentialSource;
    use crate::tests::common::{build_reqwest_client, issue_response, json};

    fn aws_provider(metadata: &MockServer, issuer: &MockServer) -> ExchangeTokenProvider {
        let client = build_reqwest_client();
        ExchangeTokenProvider::new(
            CredentialSource::AwsMetadata(AwsMetadataSource::new(client.clone(), &metadata.base_url(), 21600)),
            TokenExchanger::new(client, &issuer.base_url()),
        )
    }

    #[tokio::test]
    async fn aws_imds_credentials_are_exchanged() {
        let metadata = MockServer::start_async().await;
        let issuer = MockServer::start_async().await;

        let session = metadata
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/latest/api/token")
                    .header("X-aws-ec2-metadata-token-ttl-seconds", "21600");
                then.status(200).body("imds-session");
            })
            .await;
        let role = metadata
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/latest/meta-data/iam/security-credentials/")
                    .header("X-aws-ec2-metadata-token", "imds-session");
                then.status(200).body("app-role\n");
            })
            .await;
        let credentials = metadata
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/latest/meta-data/iam/security-credentials/app-role")
                    .header("X-aws-ec2-metadata-token", "imds-session");
                then.status(200).json_body(json!({
                    "Code": "Success",
                    "LastUpdated": "2024-05-01T10:00:00Z",
                    "Type": "AWS-HMAC",
                    "AccessKeyId": "ASIAROLE",
                    "SecretAccessKey": "role-secret",
                    "Token": "role-session",
                    "Expiration": "2024-05-01T16:00:00Z"
                }));
            })
            .await;

        let body = issue_response(json!({"organization": "998877"}), 3600, "AWSSecurityToken");
        let issue = issuer
            .mock_async(|when, then| {
                when.method(POST).path("/issue").json_body(json!({
                    "realm": "AWSSecurityToken",
                    "validity": "12h",
                    "quota": 0,
                    "metadata": {"accessKeyID": "ASIAROLE", "secretAccessKey": "role-secret", "token": "role-session"}
                }));
                then.status(200).header("content-type", "application/json").json_body(body);
            })
            .await;

        let provider = aws_provider(&metadata, &issuer);

        assert_eq!(provider.account_id().await.unwrap(), "998877");
        assert!(provider.token().await.is_ok());

        assert_eq!(session.hits_async().await, 1);
        assert_eq!(role.hits_async().await, 1);
        assert_eq!(credentials.hits_async().await, 1);
        assert_eq!(issue.hits_async().await, 1);
    }

    #[tokio::test]
    async fn aws_metadata_failure_surfaces_body() {
        let metadata = MockServer::start_async().await;
        let issuer = MockServer::start_async().await;

        metadata
            .mock_async(|when, then| {
                when.method(PUT).path("/latest/api/token");
                then.status(200).body("imds-session");
            })
            .await;
        metadata
            .mock_async(|when, then| {
                when.method(GET).path("/latest/meta-data/iam/security-credentials/");
                then.status(404).body("no role attached");
            })
            .await;
        let issue = issuer
            .mock_async(|when, then| {
                when.method(POST).path("/issue");
                then.status(200);
            })
            .await;

        let provider = aws_provider(&metadata, &issuer);

        match provider.token().await {
            Err(TokenError::Metadata { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "no role attached");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(issue.hits_async().await, 0);
    }

    #[tokio::test]
    async fn aws_failed_credential_document_is_rejected() {
        let metadata = MockServer::start_async().await;
        let issuer = MockServer::start_async().await;

        metadata
            .mock_async(|when, then| {
                when.method(PUT).path("/latest/api/token");
                then.status(200).body("imds-session");
            })
            .await;
        metadata
            .mock_async(|when, then| {
                when.method(GET).path("/latest/meta-data/iam/security-credentials/");
                then.status(200).body("app-role");
            })
            .await;
        metadata
            .mock_async(|when, then| {
                when.method(GET).path("/latest/meta-data/iam/security-credentials/app-role");
                then.status(200).json_body(json!({"Code": "AssumeRoleUnauthorizedAccess"}));
            })
            .await;

        let provider = aws_provider(&metadata, &issuer);

        let err = provider.token().await.unwrap_err();
        assert!(matches!(err, TokenError::Metadata { status: 200, .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn gcp_identity_token_is_exchanged() {
        let metadata = MockServer::start_async().await;
        let issuer = MockServer::start_async().await;

        let identity = metadata
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/computeMetadata/v1/instance/service-accounts/default/identity")
                    .query_param("audience", "aporeto")
                    .query_param("format", "full")
                    .header("Metadata-Flavor", "Google");
                then.status(200).body("gcp.identity.token");
            })
            .await;

        let body = issue_response(
            json!({"projectid": "demo-project", "projectnumber": "424242"}),
            3600,
            "GCPIdentityToken",
        );
        let issue = issuer
            .mock_async(|when, then| {
                when.method(POST).path("/issue").json_body(json!({
                    "realm": "GCPIdentityToken",
                    "validity": "12h",
                    "quota": 0,
                    "metadata": {"token": "gcp.identity.token"}
                }));
                then.status(200).header("content-type", "application/json").json_body(body);
            })
            .await;

        let client = build_reqwest_client();
        let provider = ExchangeTokenProvider::new(
            CredentialSource::GcpMetadata(GcpMetadataSource::new(client.clone(), &metadata.base_url(), "aporeto")),
            TokenExchanger::new(client, &issuer.base_url()),
        );

        assert_eq!(provider.account_id().await.unwrap(), "424242");
        assert!(provider.token().await.is_ok());
        assert_eq!(identity.hits_async().await, 1);
        assert_eq!(issue.hits_async().await, 1);
    }
}
