use anyhow::Context;
use catalogsearch::{api, config, index::SearchIndex, logging, meili::MeiliService};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing("catalog-search");
    tracing::debug!(
        meili_url = %config.meili_url,
        index = %config.meili_index,
        has_master_key = config.meili_master_key.is_some(),
        server_port = config.server_port,
        "Loaded configuration"
    );

    let service = MeiliService::from_config(config).context("failed to build Meilisearch client")?;
    service
        .health()
        .await
        .with_context(|| format!("failed to connect to Meilisearch at {}", config.meili_url))?;
    tracing::info!(url = %config.meili_url, index = %config.meili_index, "Connected to Meilisearch");

    let app = api::create_router(Arc::new(service));
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("failed to bind port {}", config.server_port))?;
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server terminated unexpectedly")
}
