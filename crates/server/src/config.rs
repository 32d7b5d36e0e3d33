use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// OAuth2 client registration issued by Stitch.
#[derive(Clone, Deserialize)]
pub struct ClientCredentials {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "default_filter_types", deserialize_with = "string_list")]
    pub filter_types: Vec<String>,
    #[serde(default = "default_refund_filter_types", deserialize_with = "string_list")]
    pub refund_filter_types: Vec<String>,
}

/// Upstream endpoints. Defaults point at production Stitch.
#[derive(Clone, Debug, Deserialize)]
pub struct StitchEndpoints {
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    /// Audience sent with the client-credentials grant.
    #[serde(default = "default_token_url")]
    pub audience: String,
}

impl Default for StitchEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            graphql_url: default_graphql_url(),
            audience: default_token_url(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for upstream calls. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    pub client: ClientCredentials,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scopes", deserialize_with = "string_list")]
    pub scopes: Vec<String>,
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub stitch: StitchEndpoints,
    /// How long a `/auth` verifier stays redeemable.
    #[serde(default = "default_verifier_ttl_secs")]
    pub verifier_ttl_secs: u64,
    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn verifier_ttl(&self) -> Duration {
        Duration::from_secs(self.verifier_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.id.trim().is_empty() {
            return Err(ConfigError::Validation("client.id must not be empty".into()));
        }
        if self.client.secret.trim().is_empty() {
            return Err(ConfigError::Validation(
                "client.secret must not be empty".into(),
            ));
        }
        if self.webhook.url.trim().is_empty() {
            return Err(ConfigError::Validation("webhook.url must not be empty".into()));
        }
        if self.verifier_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "verifier_ttl_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Lists come from YAML sequences or, via the environment, comma-separated
/// strings. Environment values stay strings so secrets like `00123` survive.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringList {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match StringList::deserialize(deserializer)? {
        StringList::List(items) => items,
        StringList::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/return".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["client_paymentrequest".to_string()]
}

fn default_filter_types() -> Vec<String> {
    vec!["payment".to_string()]
}

fn default_refund_filter_types() -> Vec<String> {
    vec!["refund".to_string()]
}

fn default_authorize_url() -> String {
    "https://secure.stitch.money/connect/authorize".to_string()
}

fn default_token_url() -> String {
    "https://secure.stitch.money/connect/token".to_string()
}

fn default_graphql_url() -> String {
    "https://api.stitch.money/graphql".to_string()
}

fn default_verifier_ttl_secs() -> u64 {
    600
}

/// Load application configuration from `config.yaml`, an optional `secrets.yaml`,
/// and environment overrides.
///
/// Environment variables use the `PROXY` prefix and `__` as the key path
/// separator, e.g. `PROXY__CLIENT__SECRET` overrides `client.secret`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from("config.yaml", Some("secrets.yaml"))
}

/// Same as [`load_config`] with explicit file locations.
pub fn load_config_from(path: &str, secrets_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let mut builder = Config::builder().add_source(File::with_name(path));
    if let Some(secrets) = secrets_path {
        builder = builder.add_source(File::with_name(secrets).required(false));
    }
    let cfg = builder
        .add_source(
            Environment::with_prefix("PROXY")
                .separator("__"),
        )
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}
