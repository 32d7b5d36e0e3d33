//! Authorization endpoint URL construction.

/// Build the authorization URL for the authorization-code + PKCE flow.
///
/// Parameters are emitted in a fixed order and percent-encoded individually.
/// Inputs are not validated; an empty scope list yields `scope=`.
pub fn build_authorization_url(
    authorize_endpoint: &str,
    client_id: &str,
    challenge: &str,
    redirect_uri: &str,
    state: &str,
    nonce: &str,
    scopes: &[String],
) -> String {
    let scope = scopes.join(" ");
    let params = [
        ("client_id", client_id),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
        ("redirect_uri", redirect_uri),
        ("scope", scope.as_str()),
        ("response_type", "code"),
        ("nonce", nonce),
        ("state", state),
    ];
    format!("{}?{}", authorize_endpoint, super::encode_pairs(&params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_query(url: &str) -> Vec<(String, String)> {
        let (_, query) = url.split_once('?').expect("query string");
        query
            .split('&')
            .map(|pair| {
                let (k, v) = pair.split_once('=').expect("key=value");
                (
                    k.to_string(),
                    urlencoding::decode(v).expect("utf-8").into_owned(),
                )
            })
            .collect()
    }

    #[test]
    fn contains_exactly_the_eight_parameters() {
        let url = build_authorization_url(
            "https://secure.stitch.money/connect/authorize",
            "client-1",
            "challenge-abc",
            "http://localhost:3000/return",
            "state-xyz",
            "nonce-123",
            &["client_paymentrequest".to_string(), "openid".to_string()],
        );
        assert!(url.starts_with("https://secure.stitch.money/connect/authorize?"));

        let params = parse_query(&url);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "client_id",
                "code_challenge",
                "code_challenge_method",
                "redirect_uri",
                "scope",
                "response_type",
                "nonce",
                "state"
            ]
        );
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("code_challenge_method"), "S256");
        assert_eq!(get("response_type"), "code");
        assert_eq!(get("scope"), "client_paymentrequest openid");
        assert_eq!(get("redirect_uri"), "http://localhost:3000/return");
        assert_eq!(get("state"), "state-xyz");
        assert_eq!(get("nonce"), "nonce-123");
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        let url = build_authorization_url(
            "https://auth.example",
            "id",
            "c",
            "http://localhost:3000/return",
            "s",
            "n",
            &["a".to_string(), "b".to_string()],
        );
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Freturn"));
        assert!(url.contains("scope=a%20b"));
    }

    #[test]
    fn empty_scopes_pass_through() {
        let url = build_authorization_url("https://auth.example", "id", "c", "", "s", "n", &[]);
        assert!(url.contains("&scope=&"));
        assert!(url.contains("redirect_uri=&"));
    }
}
