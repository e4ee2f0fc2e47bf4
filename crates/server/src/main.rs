//! Outliers server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use outliers_api::{AppState, SseBroadcaster, auth_middleware, router as api_router};
use outliers_common::{Config, DateFormatter, LocalStorage, StorageBackend, config::StorageKind};
use outliers_core::{
    AuthService, CommentService, ContentService, LikeService, MailService, NotificationService,
    ProfileService, SettingsService, UploadService,
};
use outliers_db::repositories::{
    CommentRepository, ContentRepository, LikeRepository, NotificationRepository,
    PasswordResetRepository, ProfileRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Headroom above the largest upload for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// How often idle SSE channels are dropped.
const SSE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
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
            Ok(mut stream) => {
                stream.recv().await;
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

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "outliers=debug,tower_http=debug".into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
}

#[cfg(feature = "s3")]
fn storage_backend(config: &Config) -> Result<Arc<dyn StorageBackend>, Box<dyn std::error::Error>> {
    use outliers_common::S3Storage;

    let storage = &config.storage;
    if storage.backend == StorageKind::S3 {
        let (Some(endpoint), Some(access_key), Some(secret_key)) = (
            storage.s3_endpoint.as_deref(),
            storage.s3_access_key_id.as_deref(),
            storage.s3_secret_access_key.as_deref(),
        ) else {
            return Err("S3 storage selected but endpoint or credentials are missing".into());
        };
        let region = storage.s3_region.as_deref().unwrap_or("us-east-1");
        info!(endpoint, "Using S3 object storage");
        return Ok(Arc::new(S3Storage::new(
            endpoint,
            region,
            access_key,
            secret_key,
            Some(storage.base_url.clone()),
        )));
    }

    Ok(local_storage(config))
}

#[cfg(not(feature = "s3"))]
fn storage_backend(config: &Config) -> Result<Arc<dyn StorageBackend>, Box<dyn std::error::Error>> {
    if config.storage.backend == StorageKind::S3 {
        return Err("S3 storage selected but the server was built without the s3 feature".into());
    }
    Ok(local_storage(config))
}

/// Path to mount local uploads at, when this process must serve them.
fn local_files_mount(config: &Config) -> Option<String> {
    let base_url = config.storage.base_url.trim_end_matches('/');
    (config.storage.backend == StorageKind::Local
        && base_url.starts_with('/')
        && !base_url.starts_with("//"))
    .then(|| base_url.to_string())
}

/// Serve local uploads under their public base path.
fn mount_local_files<S>(app: Router<S>, config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match local_files_mount(config) {
        Some(mount) => {
            info!(mount = %mount, "Serving uploaded files");
            app.nest_service(&mount, ServeDir::new(&config.storage.base_path))
        }
        None => app,
    }
}

fn local_storage(config: &Config) -> Arc<dyn StorageBackend> {
    info!(path = %config.storage.base_path.display(), "Using local file storage");
    Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first: it decides the log format
    let config = Config::load()?;
    init_tracing(&config);

    info!("Starting outliers server...");

    let db = outliers_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    outliers_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let content_repo = ContentRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let reset_repo = PasswordResetRepository::new(Arc::clone(&db));

    let formatter = DateFormatter::new(&config.display.timezone)?;
    let mail_service = MailService::new(&config.mail)?;
    let storage = storage_backend(&config)?;

    // Notifications are pushed to connected clients over SSE
    let sse_broadcaster = SseBroadcaster::new();
    let mut notification_service =
        NotificationService::new(notification_repo, profile_repo.clone(), formatter);
    notification_service.set_event_publisher(Arc::new(sse_broadcaster.clone()));

    // Initialize services
    let auth_service = AuthService::new(
        user_repo.clone(),
        profile_repo.clone(),
        reset_repo,
        mail_service,
        &config,
    );
    let upload_service = UploadService::new(storage, &config.storage);
    let mut profile_service = ProfileService::new(
        profile_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    profile_service.set_upload_service(upload_service.clone());
    let content_service = ContentService::new(
        content_repo,
        comment_repo.clone(),
        like_repo.clone(),
        profile_repo.clone(),
        formatter,
    );
    let comment_service = CommentService::new(
        comment_repo.clone(),
        like_repo.clone(),
        profile_repo,
        content_service.clone(),
        notification_service.clone(),
        formatter,
    );
    let like_service = LikeService::new(
        like_repo,
        comment_repo,
        content_service.clone(),
        notification_service.clone(),
    );
    let settings_service = SettingsService::new(user_repo);

    let state = AppState {
        auth_service,
        profile_service,
        content_service,
        comment_service,
        like_service,
        notification_service,
        settings_service,
        upload_service,
        sse_broadcaster: sse_broadcaster.clone(),
    };

    // Build router
    let app = mount_local_files(Router::new().nest("/api", api_router()), &config)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            config.storage.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Drop SSE channels whose clients went away
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SSE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sse_broadcaster.cleanup().await;
        }
    });

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
