use crate::error::{ApiError, UpstreamFailure};
use serde::Serialize;
use serde_json::Value;

use super::GraphQlOperation;

/// Bearer-authenticated client for the Stitch GraphQL endpoint.
#[derive(Clone, Debug)]
pub struct StitchClient {
    http: reqwest::Client,
    graphql_url: String,
}

impl StitchClient {
    pub fn new(http: reqwest::Client, graphql_url: impl Into<String>) -> Self {
        Self {
            http,
            graphql_url: graphql_url.into(),
        }
    }

    /// POST `operation` with `access_token` and return the raw response body.
    ///
    /// A response carrying `errors` fails with the first error's message and
    /// `extensions.status`; every entry is logged. A non-2xx reply without
    /// `errors` fails with the HTTP status.
    #[tracing::instrument(skip(self, access_token, operation), fields(operation = operation.operation_name))]
    pub async fn query<V: Serialize>(
        &self,
        access_token: &str,
        operation: &GraphQlOperation<V>,
    ) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(access_token)
            .json(operation)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::MalformedResponse(format!("HTTP {status}: {e}")))?;
        tracing::debug!(http_status = %status, "GraphQL response received");

        if let Some(failure) = UpstreamFailure::from_errors(&body) {
            match body.get("errors") {
                Some(Value::Array(errors)) => {
                    for error in errors {
                        tracing::warn!(error = %error, "GraphQL error");
                    }
                }
                Some(error) => tracing::warn!(error = %error, "GraphQL error"),
                None => {}
            }
            return Err(failure.into());
        }

        if let Some(failure) = UpstreamFailure::from_http_status(&body, status.as_u16()) {
            tracing::warn!(
                http_status = %status,
                error = %failure.message,
                "GraphQL endpoint rejected the request"
            );
            return Err(failure.into());
        }

        Ok(body)
    }
}

/// Walk a JSON pointer into a GraphQL response, naming the path on failure.
pub fn extract<'a>(body: &'a Value, pointer: &'static str) -> Result<&'a Value, ApiError> {
    match body.pointer(pointer) {
        Some(Value::Null) | None => Err(ApiError::MissingField(pointer)),
        Some(value) => Ok(value),
    }
}

/// Like [`extract`], for fields that must be strings (ids, urls).
pub fn extract_string(body: &Value, pointer: &'static str) -> Result<String, ApiError> {
    extract(body, pointer)?
        .as_str()
        .map(str::to_string)
        .ok_or(ApiError::MissingField(pointer))
}
