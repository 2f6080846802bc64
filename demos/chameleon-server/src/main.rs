//! Standalone Chameleon server.
//!
//! Environment:
//! - `CHAMELEON_ADDR`: listen address, default `0.0.0.0:8080`
//! - `CHAMELEON_CONFIG`: optional path to a JSON [`RoomConfig`]
//! - `RUST_LOG`: log filter, default `info`

use std::path::Path;

use chameleon::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

fn room_config_from(path: Option<&Path>) -> Result<RoomConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(RoomConfig::default());
    };
    let raw = std::fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr =
        std::env::var("CHAMELEON_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let config_path = std::env::var_os("CHAMELEON_CONFIG");
    let room_config = room_config_from(config_path.as_deref().map(Path::new))?;

    tracing::info!(%addr, ?room_config, "starting chameleon server");

    let server = ChameleonServer::builder()
        .bind(&addr)
        .room_config(room_config)
        .build()
        .await?;

    server.run().await?;
    Ok(())
}
