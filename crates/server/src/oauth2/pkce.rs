//! PKCE (RFC 7636) verifier/challenge generation and state/nonce values.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind every verifier, state and nonce.
const RANDOM_BYTES: usize = 32;

/// A PKCE verifier and its S256 challenge.
///
/// The verifier stays on the backend until the authorization-code exchange;
/// only the challenge is sent to the authorization endpoint.
#[derive(Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl std::fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkcePair")
            .field("verifier", &"<redacted>")
            .field("challenge", &self.challenge)
            .finish()
    }
}

/// Generate a fresh verifier (43 base64url characters) and its challenge.
pub fn generate_verifier_challenge_pair() -> PkcePair {
    let verifier = random_base64url();
    let challenge = compute_challenge(&verifier);
    PkcePair {
        verifier,
        challenge,
    }
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn compute_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// A fresh random value for either `state` or `nonce`.
///
/// Call once per value; state and nonce must never share a value.
pub fn generate_random_state_or_nonce() -> String {
    random_base64url()
}

fn random_base64url() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
