use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use streambox::{AppConfig, ApplicationServer, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // guards have to outlive the server or buffered logs get lost on shutdown
    let _guards = Logger::init(&config);

    info!("logger and env prepped, starting server...");

    ApplicationServer::serve(config)
        .await
        .context("server failed to start")?;

    Ok(())
}
