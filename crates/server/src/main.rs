//! Foodie Diary server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use foodie_api::{middleware::AppState, router as api_router};
use foodie_common::Config;
use foodie_core::{
    AdminService, AuthService, BookmarkService, HttpImageHost, ImageHostService, NoOpImageHost,
    PostService, UploadService,
};
use foodie_db::repositories::{BookmarkRepository, PostRepository, UserRepository};
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
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
                .unwrap_or_else(|_| "foodie=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting foodie-diary server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = foodie_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    foodie_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let bookmark_repo = BookmarkRepository::new(Arc::clone(&db));

    // Initialize the image host. Without an API key, uploads are disabled
    // rather than sent unauthenticated.
    let image_host: ImageHostService = if config.upload.api_key.is_some() {
        Arc::new(HttpImageHost::new(&config.upload)?)
    } else {
        info!("No image host API key configured; uploads are no-ops");
        Arc::new(NoOpImageHost)
    };

    // Initialize services
    let auth_service = AuthService::new(user_repo.clone(), &config);
    let post_service = PostService::new(post_repo.clone());
    let bookmark_service =
        BookmarkService::new(bookmark_repo, post_repo.clone(), user_repo.clone());
    let admin_service = AdminService::new(post_repo, user_repo);
    let upload_service = UploadService::new(image_host, &config.upload);

    // Create app state
    let state = AppState {
        auth_service,
        post_service,
        bookmark_service,
        admin_service,
        upload_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            foodie_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
