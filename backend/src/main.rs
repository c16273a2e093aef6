//! Backend entry-point: wires the user-administration REST API.

use std::env;
use std::net::SocketAddr;

use actix_web::web;
use reqwest::Url;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use campus_backend::inbound::http::health::HealthState;
use campus_backend::outbound::identity::IdentityProviderSettings;
use campus_backend::outbound::persistence::{DbPool, PoolConfig};
use campus_backend::server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let bind_text = env::var("CAMPUS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let bind_addr: SocketAddr = bind_text.parse().map_err(|e| {
        std::io::Error::other(format!("invalid CAMPUS_BIND_ADDR {bind_text}: {e}"))
    })?;

    let mut config = ServerConfig::new(bind_addr);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        config = config.with_db_pool(pool);
    }

    if let (Ok(url), Ok(key)) = (env::var("IDENTITY_URL"), env::var("IDENTITY_SERVICE_KEY")) {
        let base_url = Url::parse(&url)
            .map_err(|e| std::io::Error::other(format!("invalid IDENTITY_URL {url}: {e}")))?;
        config = config.with_identity(IdentityProviderSettings::new(base_url, key));
    }

    let health_state = web::Data::new(HealthState::new());
    // Clone for server assembly so readiness stays flippable from here.
    let server_health_state = health_state.clone();
    let server =
        create_server(config, server_health_state).map_err(|e| std::io::Error::other(e.to_string()))?;

    health_state.mark_ready();
    server.await
}
