use anyhow::Result;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use video_gallery::{
    config::AppConfig,
    routes::routes,
    services::{local_container::LocalContainer, video_library::VideoLibrary},
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Load .env before anything reads the environment ---
    dotenvy::dotenv().ok();

    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting video-gallery with config: {:?}", cfg);

    // --- Open the storage backend (creates directories and schema) ---
    let container =
        LocalContainer::connect(&cfg.database_url, &cfg.storage_dir, &cfg.container).await?;

    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize core service ---
    let library = VideoLibrary::new(
        Arc::new(container),
        cfg.display.clone(),
        cfg.placeholder_image_url.clone(),
    );

    // --- Build router ---
    let app = routes::app(library, cfg.max_upload_bytes);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
