use std::sync::Arc;

use clap::Parser;
use shortwave_gateway::app::App;
use shortwave_gateway::cli::Cli;
use shortwave_gateway::state::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = cli.build_store().await?;

    let state = AppState::new(Arc::clone(&store), cli.base_url.clone());
    let listener = tokio::net::TcpListener::bind(cli.server_address).await?;
    info!(
        listen_addr = %listener.local_addr()?,
        base_url = %cli.base_url,
        "starting shortwave gateway"
    );

    shortwave_gateway::serve::run(listener, App::router(state), store, shutdown_signal()).await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
