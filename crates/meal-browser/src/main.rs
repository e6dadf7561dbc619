mod browse;
mod catalog;
mod config;
mod details;
mod error;
mod server;
mod view;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use mealdb_common::gateway::MealDbClient;
use server::MealBrowserServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting meal-browser MCP server");

    let config = Config::from_env()?;
    info!(
        base_url = %config.mealdb.base_url,
        timeout_ms = config.mealdb.default_timeout.as_millis(),
        meal_page_size = config.meal_page_size.get(),
        ingredient_page_size = config.ingredient_page_size.get(),
        "configuration loaded"
    );

    let client = Arc::new(MealDbClient::new(config.mealdb.clone())?);
    let server = MealBrowserServer::new(client, config.clone());

    if let Some(addr) = config.tcp_listen_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let session = server.new_session();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = session.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
