//! # Prisma Token Library
//!
//! Exchanges cloud-provider identity material (static AWS keys, instance
//! metadata credentials, GCP identity tokens) for short-lived Prisma API
//! bearer tokens, caches them until expiry, and exposes them through the
//! `TokenProvider` trait. Externally supplied tokens are served as-is.
//!
//! Modules:
//! - `sources`: credential sources producing exchange material
//! - `exchange`: the `POST /issue` token exchange
//! - `cache`: issued token types and the per-provider token cache
//! - `provider`: the public `TokenProvider` contract
//! - `config`: YAML configuration, loading and validation

pub mod cache;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod provider;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::token::{Claims, ClaimsData, IssuedToken};
pub use crate::config::types::{ProviderConfig, ServiceConfig};
pub use crate::errors::{ApiError, TokenError};
pub use crate::provider::{ExchangeTokenProvider, Provider, TokenProvider};
pub use crate::sources::external::ExternalTokenProvider;
