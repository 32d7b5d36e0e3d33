//! OAuth2 client side of the proxy.
//!
//! ## Supported Flows
//!
//! - Authorization Code with PKCE (S256)
//! - Client Credentials
//! - Refresh Token
//!
//! The proxy never issues tokens itself; it talks to the Stitch token endpoint
//! on behalf of the frontend and keeps PKCE verifiers server-side.

pub mod authorize;
pub mod pkce;
pub mod store;
pub mod token;

pub use authorize::build_authorization_url;
pub use pkce::{
    PkcePair, compute_challenge, generate_random_state_or_nonce, generate_verifier_challenge_pair,
};
pub use store::{InMemoryVerifierStore, VerifierStore};
pub use token::{TokenClient, TokenResponse};

/// OpenAPI tag for the token routes.
pub const OAUTH2_TAG: &str = "OAuth2";

/// `key=value` pairs joined with `&`, each value percent-encoded.
pub(crate) fn encode_pairs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::encode_pairs;

    #[test]
    fn encodes_values_not_keys() {
        let body = encode_pairs(&[("grant_type", "client_credentials"), ("scope", "a b&c")]);
        assert_eq!(body, "grant_type=client_credentials&scope=a%20b%26c");
    }

    #[test]
    fn empty_input_is_empty_body() {
        assert_eq!(encode_pairs(&[]), "");
    }
}
