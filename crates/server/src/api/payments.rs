//! GraphQL forwarding routes: webhooks, payment requests and refunds.
//!
//! Each route builds one fixed operation, sends it with the caller's access
//! token and reshapes the relevant part of the response.

use crate::{
    AppState,
    api::SUCCESS,
    error::ProxyError,
    graphql::{
        Money, PAYMENTS_TAG, PaymentRequest,
        client::{extract, extract_string},
        client_webhook_add, create_payment_request, create_refund, list_webhook_endpoints,
    },
    oauth2::generate_random_state_or_nonce,
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(subscribe_payment_request))
        .routes(routes!(subscribe_refund))
        .routes(routes!(get_webhook_endpoints))
        .routes(routes!(post_payment_request))
        .routes(routes!(post_bank_payment_request))
        .routes(routes!(post_refund))
        .with_state(state)
}

#[derive(Deserialize, ToSchema)]
pub struct AccessTokenBody {
    /// Stitch access token used as the bearer credential.
    pub access_token: String,
}

#[derive(Deserialize, IntoParams)]
pub struct AccessTokenParams {
    pub access_token: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequestBody {
    #[serde(rename = "access_token")]
    pub access_token: String,
    pub amount: Money,
    #[serde(default)]
    pub payer_reference: Option<String>,
    #[serde(default)]
    pub beneficiary_reference: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub bank_id: Option<String>,
    #[serde(default)]
    pub beneficiary_account_number: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    /// Card-only request when true (default); bank-account beneficiary otherwise.
    #[serde(default = "default_card")]
    pub card: bool,
}

fn default_card() -> bool {
    true
}

impl CreatePaymentRequestBody {
    fn into_parts(self) -> (String, PaymentRequest) {
        (
            self.access_token,
            PaymentRequest {
                amount: self.amount,
                payer_reference: self.payer_reference,
                beneficiary_reference: self.beneficiary_reference,
                external_reference: self.external_reference,
                beneficiary_name: self.beneficiary_name,
                beneficiary_bank_id: self.bank_id,
                beneficiary_account_number: self.beneficiary_account_number,
                merchant: self.merchant,
                card: self.card,
            },
        )
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateRefundBody {
    pub access_token: String,
    pub amount: Money,
    /// Stitch `RefundReason`, e.g. `alreadyPaid`.
    pub refund: String,
    /// Beneficiary reference shown on the refund.
    pub reference: String,
    /// Payment request being refunded.
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookSubscribedResponse {
    #[schema(example = "Success")]
    pub message: String,
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEndpointsResponse {
    #[schema(example = "Success")]
    pub message: String,
    #[schema(value_type = Vec<Object>)]
    pub webhook_endpoints: Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequestCreatedResponse {
    #[schema(example = "Success")]
    pub message: String,
    pub id: String,
    /// URL the payer should be sent to.
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundCreatedResponse {
    #[schema(example = "Success")]
    pub message: String,
    pub id: String,
    pub payment_id: String,
}

async fn subscribe_webhook(
    state: &AppState,
    access_token: &str,
    filter_types: &[String],
) -> Result<Json<WebhookSubscribedResponse>, ProxyError> {
    let operation = client_webhook_add(&state.config.webhook.url, filter_types);
    let response = state.stitch.query(access_token, &operation).await?;
    let id = extract_string(&response, "/data/clientWebhookAdd/id")?;
    tracing::info!(webhook_id = %id, filter_types = ?filter_types, "webhook registered");

    Ok(Json(WebhookSubscribedResponse {
        message: SUCCESS.to_string(),
        id,
    }))
}

/// Register the configured webhook for payment events.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post,
    path = "/subscribe-payment-request",
    request_body = AccessTokenBody,
    tag = PAYMENTS_TAG,
    operation_id = "Subscribe Payment Webhook",
    responses(
        (status = 200, description = "Webhook registered", body = WebhookSubscribedResponse),
        (status = 500, description = "GraphQL failure; other statuses mirror the upstream error", body = str, content_type = "text/plain")
    )
)]
pub async fn subscribe_payment_request(
    State(state): State<AppState>,
    Json(body): Json<AccessTokenBody>,
) -> Result<Json<WebhookSubscribedResponse>, ProxyError> {
    subscribe_webhook(&state, &body.access_token, &state.config.webhook.filter_types).await
}

/// Register the configured webhook for refund events.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post,
    path = "/subscribe-refund",
    request_body = AccessTokenBody,
    tag = PAYMENTS_TAG,
    operation_id = "Subscribe Refund Webhook",
    responses(
        (status = 200, description = "Webhook registered", body = WebhookSubscribedResponse),
        (status = 500, description = "GraphQL failure", body = str, content_type = "text/plain")
    )
)]
pub async fn subscribe_refund(
    State(state): State<AppState>,
    Json(body): Json<AccessTokenBody>,
) -> Result<Json<WebhookSubscribedResponse>, ProxyError> {
    subscribe_webhook(
        &state,
        &body.access_token,
        &state.config.webhook.refund_filter_types,
    )
    .await
}

#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/list-webhook-endpoints",
    params(AccessTokenParams),
    tag = PAYMENTS_TAG,
    operation_id = "List Webhook Endpoints",
    responses(
        (status = 200, description = "Registered webhook endpoints", body = WebhookEndpointsResponse),
        (status = 500, description = "GraphQL failure", body = str, content_type = "text/plain")
    )
)]
pub async fn get_webhook_endpoints(
    State(state): State<AppState>,
    Query(params): Query<AccessTokenParams>,
) -> Result<Json<WebhookEndpointsResponse>, ProxyError> {
    let operation = list_webhook_endpoints(&state.config.webhook.filter_types);
    let response = state.stitch.query(&params.access_token, &operation).await?;
    let endpoints = extract(&response, "/data/client/webhookEndpoints")?;

    Ok(Json(WebhookEndpointsResponse {
        message: SUCCESS.to_string(),
        webhook_endpoints: endpoints.clone(),
    }))
}

async fn submit_payment_request(
    state: &AppState,
    access_token: &str,
    request: PaymentRequest,
) -> Result<Json<PaymentRequestCreatedResponse>, ProxyError> {
    let operation = create_payment_request(&request);
    let response = state.stitch.query(access_token, &operation).await?;
    let id = extract_string(
        &response,
        "/data/clientPaymentInitiationRequestCreate/paymentInitiationRequest/id",
    )?;
    let url = extract_string(
        &response,
        "/data/clientPaymentInitiationRequestCreate/paymentInitiationRequest/url",
    )?;
    tracing::info!(payment_request_id = %id, card = request.card, "payment request created");

    Ok(Json(PaymentRequestCreatedResponse {
        message: SUCCESS.to_string(),
        id,
        url,
    }))
}

/// Create a payment initiation request; `card` selects the payment flow.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post,
    path = "/create-payment-request",
    request_body = CreatePaymentRequestBody,
    tag = PAYMENTS_TAG,
    operation_id = "Create Payment Request",
    responses(
        (status = 200, description = "Payment request created", body = PaymentRequestCreatedResponse),
        (status = 500, description = "GraphQL failure", body = str, content_type = "text/plain")
    )
)]
pub async fn post_payment_request(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequestBody>,
) -> Result<Json<PaymentRequestCreatedResponse>, ProxyError> {
    let (access_token, request) = body.into_parts();
    submit_payment_request(&state, &access_token, request).await
}

/// Create a bank-account beneficiary payment request regardless of `card`.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post,
    path = "/create-payment-request-bank",
    request_body = CreatePaymentRequestBody,
    tag = PAYMENTS_TAG,
    operation_id = "Create Bank Payment Request",
    responses(
        (status = 200, description = "Payment request created", body = PaymentRequestCreatedResponse),
        (status = 500, description = "GraphQL failure", body = str, content_type = "text/plain")
    )
)]
pub async fn post_bank_payment_request(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequestBody>,
) -> Result<Json<PaymentRequestCreatedResponse>, ProxyError> {
    let (access_token, mut request) = body.into_parts();
    request.card = false;
    submit_payment_request(&state, &access_token, request).await
}

/// Initiate a refund against an existing payment request.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post,
    path = "/create-refund",
    request_body = CreateRefundBody,
    tag = PAYMENTS_TAG,
    operation_id = "Create Refund",
    responses(
        (status = 200, description = "Refund initiated", body = RefundCreatedResponse),
        (status = 500, description = "GraphQL failure", body = str, content_type = "text/plain")
    )
)]
pub async fn post_refund(
    State(state): State<AppState>,
    Json(body): Json<CreateRefundBody>,
) -> Result<Json<RefundCreatedResponse>, ProxyError> {
    // Fresh per request; Stitch uses it to deduplicate refund submissions.
    let nonce = generate_random_state_or_nonce();
    let operation = create_refund(body.amount, &body.refund, &nonce, &body.reference, &body.id);
    let response = state.stitch.query(&body.access_token, &operation).await?;
    let id = extract_string(&response, "/data/clientRefundInitiate/refund/id")?;
    let payment_id = extract_string(
        &response,
        "/data/clientRefundInitiate/refund/paymentInitiationRequest/id",
    )?;
    tracing::info!(refund_id = %id, payment_request_id = %payment_id, "refund initiated");

    Ok(Json(RefundCreatedResponse {
        message: SUCCESS.to_string(),
        id,
        payment_id,
    }))
}
