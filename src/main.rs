use candidate_tracker::{
    config::init_config,
    database::{
        candidate_store::PgCandidateStore,
        pool::{create_pool, run_migrations},
    },
    routes,
    services::upload_service::UploadService,
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = init_config()?;
    info!(environment = ?config.environment, "Configuration loaded");

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;

    let upload_service = UploadService::new(
        config.uploads_dir.clone(),
        config.uploads_enabled,
        config.max_upload_bytes,
    );
    upload_service.ensure_dir().await?;
    if upload_service.is_enabled() {
        info!("Serving uploads from: {}", upload_service.dir().display());
    } else {
        info!("Photo uploads are disabled; accepting JSON-only submissions");
    }

    let app_state = AppState::new(Arc::new(PgCandidateStore::new(pool)), upload_service);
    let app = routes::app(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
