use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use auth_cell::AppState;
use shared_config::AppConfig;
use shared_database::{
    InMemoryAccountStore, InMemoryAppointmentStore, InMemorySessionRegistry, RedisSessionRegistry,
    SessionRegistry,
};
use shared_models::error::AppError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic booking API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());
    AppError::expose_internal_details(config.is_development());

    // Session registry: Redis when configured, otherwise process-local
    let registry: Arc<dyn SessionRegistry> = match &config.redis_url {
        Some(url) => {
            info!("Using Redis session registry");
            Arc::new(
                RedisSessionRegistry::connect(url)
                    .await
                    .context("connecting to the Redis session registry")?,
            )
        }
        None => {
            info!("REDIS_URL not set, sessions are kept in memory");
            Arc::new(InMemorySessionRegistry::new())
        }
    };

    // Create shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(InMemoryAppointmentStore::new()),
        registry,
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}
