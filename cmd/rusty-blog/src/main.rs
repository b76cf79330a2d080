//! # Rusty-Blog Binary
//!
//! Assembles the application from the adapters selected at compile time.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::{router, AppState, Ports, RateLimiter};
use auth_adapters::{Argon2Hasher, JwtIssuer};
use configs::{AppConfig, LoggingConfig, StorageBackend};
use secrecy::ExposeSecret;
use storage_adapters::MemoryStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.logging);
    if config.uses_fallback_secret() {
        warn!("JWT_SECRET not set, signing tokens with the built-in fallback secret");
    }

    let tokens = Arc::new(JwtIssuer::new(
        config.auth.jwt_secret.expose_secret().as_bytes(),
        chrono::Duration::seconds(config.auth.token_ttl_secs),
    ));
    let hasher = Arc::new(Argon2Hasher::new());

    let ports = match config.database.backend {
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            let store = PgStore::connect(
                config.database.url.expose_secret(),
                config.database.max_connections,
            )
            .await
            .context("connecting to postgres")?;
            if config.database.run_migrations {
                store.migrate().await.context("running migrations")?;
            }
            let store = Arc::new(store);
            Ports {
                users: store.clone(),
                posts: store.clone(),
                comments: store.clone(),
                votes: store,
                hasher,
                tokens,
            }
        }
        #[cfg(not(feature = "db-postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("postgres backend requested but the db-postgres feature is disabled")
        }
        StorageBackend::Memory => {
            info!("using the in-memory store, data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            Ports {
                users: store.clone(),
                posts: store.clone(),
                comments: store.clone(),
                votes: store,
                hasher,
                tokens,
            }
        }
    };

    let mut state = AppState::new(ports);
    if config.rate_limit.enabled {
        let window = Duration::from_secs(config.rate_limit.window_secs);
        state = state.with_rate_limiter(RateLimiter::new(window, config.rate_limit.max_requests));
        if let Some(limiter) = state.rate_limiter.clone() {
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(window);
                loop {
                    tick.tick().await;
                    limiter.prune();
                }
            });
        }
    }

    let app = router(state);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "rusty-blog listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("rusty-blog stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
