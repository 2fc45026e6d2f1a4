mod clock;
mod config;
mod db;
mod errors;
mod mail;
mod models;
mod profiles;
mod routes;
mod state;
mod tokens;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::create_pool;
use crate::mail::{HttpMailer, LogMailer, Mailer};
use crate::profiles::{InMemoryProfileRepository, PgProfileRepository, ProfileRepository, ProfileStore};
use crate::routes::build_router;
use crate::state::AppState;
use crate::tokens::{InMemoryTokenStore, RedisTokenStore, TokenRegistry, TokenStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting profile collector v{}", env!("CARGO_PKG_VERSION"));

    errors::expose_error_details(config.is_development());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Profiles: Postgres when configured, otherwise process memory
    let profile_repo: Arc<dyn ProfileRepository> = match &config.database_url {
        Some(url) => Arc::new(PgProfileRepository::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; profiles are kept in memory and lost on restart");
            Arc::new(InMemoryProfileRepository::new())
        }
    };

    // Tokens: Redis for stateless deployments, otherwise an in-process map
    let token_store: Arc<dyn TokenStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisTokenStore::connect(url).await?),
        None => {
            warn!("REDIS_URL not set; tokens are only valid on this instance");
            Arc::new(InMemoryTokenStore::new())
        }
    };

    let mailer: Arc<dyn Mailer> = match HttpMailer::from_config(&config.mail)? {
        Some(mailer) => {
            info!("Mail API client initialized");
            Arc::new(mailer)
        }
        None => {
            warn!("Mail API not configured; invitation emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    if config.accept_unregistered_tokens {
        warn!("ACCEPT_UNREGISTERED_TOKENS is on; submissions are not gated by the token registry");
    }

    let state = AppState {
        tokens: TokenRegistry::new(token_store, clock.clone()),
        profiles: ProfileStore::new(profile_repo, clock),
        mailer,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
