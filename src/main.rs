mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::{database, middleware};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::AuthService;
use crate::features::categories::routes as categories_routes;
use crate::features::categories::services::CategoryService;
use crate::features::comments::routes as comments_routes;
use crate::features::comments::services::CommentService;
use crate::features::locations::services::LocationService;
use crate::features::posts::handlers::PostsState;
use crate::features::posts::routes as posts_routes;
use crate::features::posts::services::PostService;
use crate::features::users::routes as users_routes;
use crate::features::users::services::UserService;
use crate::modules::storage::MediaStore;
use axum::{extract::DefaultBodyLimit, middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_sessions::{cookie::SameSite, MemoryStore, SessionManagerLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize services
    let users = Arc::new(UserService::new(pool.clone()));
    let auth = Arc::new(AuthService::new(pool.clone()));
    let categories = Arc::new(CategoryService::new(pool.clone()));
    let locations = Arc::new(LocationService::new(pool.clone()));
    let posts = Arc::new(PostService::new(pool.clone()));
    let comments = Arc::new(CommentService::new(pool.clone()));
    tracing::info!("Services initialized");

    // Initialize media storage for uploaded images
    let media = Arc::new(
        MediaStore::new(&config.media)
            .map_err(|e| anyhow::anyhow!("Failed to initialize media storage: {}", e))?,
    );
    tracing::info!("Media storage initialized at {:?}", media.root());

    let posts_state = Arc::new(PostsState {
        posts: Arc::clone(&posts),
        comments: Arc::clone(&comments),
        categories: Arc::clone(&categories),
        locations: Arc::clone(&locations),
        media: Arc::clone(&media),
    });

    // Set up session management
    if config.session.secure_cookies {
        tracing::info!("Secure session cookies enabled");
    } else {
        tracing::warn!(
            "Secure session cookies disabled - set SESSION_SECURE_COOKIES=true behind HTTPS"
        );
    }
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.session.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_name(config.session.cookie_name.clone())
        .with_http_only(true);

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Build application router
    let app = Router::new()
        .merge(posts_routes::routes(posts_state))
        .merge(comments_routes::routes(
            Arc::clone(&comments),
            Arc::clone(&posts),
        ))
        .merge(categories_routes::routes(
            Arc::clone(&categories),
            Arc::clone(&posts),
        ))
        .merge(users_routes::routes(Arc::clone(&users), Arc::clone(&posts)))
        .merge(auth_routes::routes(auth, Arc::clone(&users)))
        .merge(health_route)
        // Uploaded images
        .nest_service("/media", ServeDir::new(media.root()))
        // Resolve the session to a viewer identity on every request
        .layer(from_fn_with_state(
            Arc::clone(&users),
            middleware::load_current_user,
        ))
        .layer(session_layer)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));

    axum::serve(listener, app).await?;

    Ok(())
}
