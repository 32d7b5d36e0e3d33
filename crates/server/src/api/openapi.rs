//! OpenAPI/Utoipa configuration.

use crate::api::health::MISC_TAG;
use crate::graphql::PAYMENTS_TAG;
use crate::oauth2::OAUTH2_TAG;
use utoipa::OpenApi;

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stitch Proxy API",
        version = "1.0.0",
        description = "Token acquisition and GraphQL forwarding for the Stitch payments API."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = OAUTH2_TAG, description = "OAuth2 token endpoints"),
        (name = PAYMENTS_TAG, description = "Webhook, payment request and refund endpoints")
    )
)]
pub struct ApiDoc;
