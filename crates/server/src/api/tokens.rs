//! OAuth2 token routes.
//!
//! `/auth` starts the authorization-code flow and parks the PKCE verifier
//! under a fresh state; `/user-token` redeems it. `/client-token` and
//! `/refresh-token` are straight grant pass-throughs.

use crate::{
    AppState,
    api::SUCCESS,
    error::{AuthError, ProxyError},
    oauth2::{
        OAUTH2_TAG, build_authorization_url, generate_random_state_or_nonce,
        generate_verifier_challenge_pair,
    },
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(client_token))
        .routes(routes!(refresh_token))
        .routes(routes!(user_token))
        .routes(routes!(authorize))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenResponse {
    #[schema(example = "Success")]
    pub message: String,
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTokenResponse {
    #[schema(example = "Success")]
    pub message: String,
    pub user_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizationUrlResponse {
    /// Authorization endpoint URL the frontend should navigate to.
    pub url: String,
}

#[derive(Deserialize, IntoParams)]
pub struct RefreshTokenParams {
    pub refresh_token: String,
}

#[derive(Deserialize, IntoParams)]
pub struct UserTokenParams {
    /// State returned by the authorization server, as issued by `/auth`.
    pub state: String,
    /// Authorization code returned by the authorization server.
    pub code: String,
}

/// Client-credentials token for the configured client.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/client-token",
    tag = OAUTH2_TAG,
    operation_id = "Get Client Token",
    responses(
        (status = 200, description = "Client token issued", body = ClientTokenResponse),
        (status = 500, description = "Token endpoint failure; other statuses mirror the upstream error", body = str, content_type = "text/plain")
    )
)]
pub async fn client_token(
    State(state): State<AppState>,
) -> Result<Json<ClientTokenResponse>, ProxyError> {
    let client = &state.config.client;
    let token = state
        .tokens
        .retrieve_token_using_client_secret(&client.id, &client.secret, &state.config.scopes)
        .await?;

    Ok(Json(ClientTokenResponse {
        message: SUCCESS.to_string(),
        access_token: token.access_token,
    }))
}

/// Exchange a refresh token for a new user token.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/refresh-token",
    params(RefreshTokenParams),
    tag = OAUTH2_TAG,
    operation_id = "Refresh User Token",
    responses(
        (status = 200, description = "Token refreshed", body = UserTokenResponse),
        (status = 500, description = "Token endpoint failure", body = str, content_type = "text/plain")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Query(params): Query<RefreshTokenParams>,
) -> Result<Json<UserTokenResponse>, ProxyError> {
    let client = &state.config.client;
    let token = state
        .tokens
        .retrieve_token_using_refresh_token(&client.id, &params.refresh_token, &client.secret)
        .await?;

    Ok(Json(UserTokenResponse {
        message: SUCCESS.to_string(),
        user_token: token.access_token,
        refresh_token: token.refresh_token,
    }))
}

/// Redeem an authorization code using the verifier cached by `/auth`.
///
/// The verifier is consumed whether or not the exchange succeeds.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/user-token",
    params(UserTokenParams),
    tag = OAUTH2_TAG,
    operation_id = "Get User Token",
    responses(
        (status = 200, description = "User token issued", body = UserTokenResponse),
        (status = 400, description = "No verifier is cached for this state", body = str, content_type = "text/plain"),
        (status = 500, description = "Token endpoint failure", body = str, content_type = "text/plain")
    )
)]
pub async fn user_token(
    State(state): State<AppState>,
    Query(params): Query<UserTokenParams>,
) -> Result<Json<UserTokenResponse>, ProxyError> {
    let verifier = state
        .verifiers
        .take(&params.state)
        .ok_or(AuthError::UnknownState)?;

    let config = &state.config;
    let token = state
        .tokens
        .retrieve_token_using_authorization_code(
            &config.client.id,
            &config.redirect_uri,
            &verifier,
            &params.code,
            &config.client.secret,
        )
        .await?;

    Ok(Json(UserTokenResponse {
        message: SUCCESS.to_string(),
        user_token: token.access_token,
        refresh_token: token.refresh_token,
    }))
}

/// Start an authorization-code flow.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/auth",
    tag = OAUTH2_TAG,
    operation_id = "Get Authorization URL",
    description = "Generates a PKCE pair, state and nonce, caches the verifier under the state \
                   and returns the authorization URL. Pass the returned `state` and `code` to \
                   `/user-token` once the user is redirected back.",
    responses(
        (status = 200, description = "Authorization URL", body = AuthorizationUrlResponse)
    )
)]
pub async fn authorize(State(state): State<AppState>) -> Json<AuthorizationUrlResponse> {
    let pkce = generate_verifier_challenge_pair();
    let csrf_state = generate_random_state_or_nonce();
    let nonce = generate_random_state_or_nonce();

    let config = &state.config;
    let url = build_authorization_url(
        &config.stitch.authorize_url,
        &config.client.id,
        &pkce.challenge,
        &config.redirect_uri,
        &csrf_state,
        &nonce,
        &config.scopes,
    );
    state.verifiers.put(csrf_state, pkce.verifier);
    tracing::debug!(pending = state.verifiers.len(), "cached PKCE verifier");

    Json(AuthorizationUrlResponse { url })
}
