//! Shared constants and invariants

/// Requested lifetime of every issued token.
pub const TOKEN_VALIDITY: &str = "12h";
pub const TOKEN_QUOTA: u32 = 0;
pub const ISSUE_PATH: &str = "/issue";

// Realms understood by the issuer
pub const REALM_AWS: &str = "AWSSecurityToken";
pub const REALM_GCP: &str = "GCPIdentityToken";

// AWS instance metadata service (IMDSv2)
pub const AWS_METADATA_ENDPOINT: &str = "http://169.254.169.254";
pub const AWS_METADATA_TOKEN_PATH: &str = "/latest/api/token";
pub const AWS_METADATA_ROLE_PATH: &str = "/latest/meta-data/iam/security-credentials/";
pub const AWS_METADATA_TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
pub const AWS_METADATA_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
pub const AWS_METADATA_TOKEN_TTL_SECONDS: u64 = 21600;

// AWS Lambda injected credentials
pub const AWS_ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";

// GCP metadata server
pub const GCP_METADATA_ENDPOINT: &str = "http://metadata.google.internal";
pub const GCP_IDENTITY_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/identity";
pub const GCP_METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
pub const GCP_IDENTITY_AUDIENCE: &str = "aporeto";

/// Checked in order; the first non-empty value is the bearer token.
pub const EXTERNAL_TOKEN_ENVS: [&str; 3] = ["PRISMA_TOKEN", "APOCTL_TOKEN", "ENFORCERD_TOKEN"];
