//! Token endpoint client.
//!
//! All grants share one wire contract: a form-urlencoded POST to the token
//! endpoint, a JSON response, and the first upstream error surfaced as an
//! [`AuthError`].

use crate::error::{AuthError, UpstreamFailure};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Token endpoint response.
///
/// Only the two tokens the handlers forward are typed. Everything else
/// (`expires_in`, `token_type`, `scope`, `id_token`, ...) is passed through
/// untouched in `extra`, whatever shape the provider sends.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.extra.get("expires_in"))
            .field("token_type", &self.extra.get("token_type"))
            .field("scope", &self.extra.get("scope"))
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct TokenClient {
    http: reqwest::Client,
    token_url: String,
    audience: String,
}

impl TokenClient {
    pub fn new(http: reqwest::Client, token_url: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            audience: audience.into(),
        }
    }

    /// `client_credentials` grant.
    #[tracing::instrument(skip(self, client_secret))]
    pub async fn retrieve_token_using_client_secret(
        &self,
        client_id: &str,
        client_secret: &str,
        scopes: &[String],
    ) -> Result<TokenResponse, AuthError> {
        let scope = scopes.join(" ");
        self.request_token(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("scope", scope.as_str()),
            ("audience", self.audience.as_str()),
            ("client_secret", client_secret),
        ])
        .await
    }

    /// `authorization_code` grant. `verifier` must be the one whose challenge
    /// went out with the matching authorization request.
    #[tracing::instrument(skip(self, verifier, code, client_secret))]
    pub async fn retrieve_token_using_authorization_code(
        &self,
        client_id: &str,
        redirect_uri: &str,
        verifier: &str,
        code: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", verifier),
            ("client_secret", client_secret),
        ])
        .await
    }

    /// `refresh_token` grant.
    #[tracing::instrument(skip(self, refresh_token, client_secret))]
    pub async fn retrieve_token_using_refresh_token(
        &self,
        client_id: &str,
        refresh_token: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("refresh_token", refresh_token),
            ("client_secret", client_secret),
        ])
        .await
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(super::encode_pairs(params))
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::MalformedResponse(format!("HTTP {status}: {e}")))?;

        if let Some(failure) = UpstreamFailure::from_errors(&body)
            .or_else(|| UpstreamFailure::from_oauth_error(&body, status))
        {
            tracing::warn!(
                upstream_status = ?failure.status,
                error = %failure.message,
                "token endpoint returned an error"
            );
            return Err(failure.into());
        }

        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        tracing::debug!(token = ?token, "token issued");
        Ok(token)
    }
}
