//! Nightline server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use nightline_api::{AppState, auth_middleware, router as api_router};
use nightline_common::Config;
use nightline_core::{EventService, SessionService, SupportService, UserService};
use nightline_db::repositories::{
    EventRepository, SessionRepository, SupportRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nightline=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting Nightline server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = nightline_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    nightline_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let support_repo = SupportRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let session_service = SessionService::new(
        session_repo,
        user_repo.clone(),
        user_service.clone(),
        config.auth.session_ttl_hours,
    );
    let event_service = EventService::new(event_repo, user_repo.clone(), &config.events);
    let support_service = SupportService::new(support_repo, user_repo);

    if let Some(owner) = &config.auth.bootstrap_owner
        && user_service.ensure_owner(owner).await?
    {
        info!(username = %owner.username, "Created bootstrap owner account");
    }

    session_service.purge_expired().await?;

    let state = AppState {
        user_service,
        session_service,
        event_service,
        support_service,
        instance: config.instance.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
