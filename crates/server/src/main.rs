use std::sync::Arc;

use stitch_proxy::AppState;
use stitch_proxy::api::start_webserver;
use stitch_proxy::config::load_config_or_panic;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "stitch_proxy=info,tower_http=info,reqwest=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let layer = fmt::layer().with_target(true).with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    // A missing .env is fine; real deployments set variables directly.
    let dotenv = dotenvy::dotenv();

    initialize_tracing();
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let config = Arc::new(load_config_or_panic());
    tracing::info!(
        client_id = %config.client.id,
        redirect_uri = %config.redirect_uri,
        scopes = ?config.scopes,
        token_url = %config.stitch.token_url,
        graphql_url = %config.stitch.graphql_url,
        verifier_ttl_secs = config.verifier_ttl_secs,
        "configuration loaded"
    );

    let state = AppState::new(config)?;
    start_webserver(state).await?;
    Ok(())
}
