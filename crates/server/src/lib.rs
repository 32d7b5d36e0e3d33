//! Backend proxy between a frontend and the Stitch payments API.
//!
//! The proxy performs the OAuth2 flows (authorization code with PKCE, client
//! credentials, refresh token) against the Stitch token endpoint and forwards
//! a fixed set of GraphQL operations with the resulting bearer tokens.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::graphql::StitchClient;
use crate::oauth2::{InMemoryVerifierStore, TokenClient, VerifierStore};

pub mod api;
pub mod config;
pub mod error;
pub mod graphql;
pub mod oauth2;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenClient,
    pub stitch: StitchClient,
    pub verifiers: Arc<dyn VerifierStore>,
}

impl AppState {
    /// Build state with an in-memory verifier store using the configured TTL.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, reqwest::Error> {
        let store = Arc::new(InMemoryVerifierStore::new(config.verifier_ttl()));
        Self::with_verifier_store(config, store)
    }

    pub fn with_verifier_store(
        config: Arc<AppConfig>,
        verifiers: Arc<dyn VerifierStore>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("stitch-proxy/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.http.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self {
            tokens: TokenClient::new(
                http.clone(),
                config.stitch.token_url.clone(),
                config.stitch.audience.clone(),
            ),
            stitch: StitchClient::new(http, config.stitch.graphql_url.clone()),
            verifiers,
            config,
        })
    }
}
