//! GraphQL access to the Stitch API.
//!
//! Query and mutation documents live in `graphql/*.graphql` next to the crate
//! manifest and are compiled in; [`operations`] pairs each document with its
//! typed variables.

pub mod client;
pub mod operations;

pub use client::StitchClient;
pub use operations::{
    GraphQlOperation, Money, PaymentRequest, client_webhook_add, create_payment_request,
    create_refund, list_webhook_endpoints,
};

/// OpenAPI tag for the GraphQL forwarding routes.
pub const PAYMENTS_TAG: &str = "Payments";
