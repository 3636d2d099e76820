//! Service initialization and application state setup

use crate::auth::JwtManager;
use crate::setup::database::setup_database;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::{Config, StorageBackend};
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use tubely_processing::{FfmpegFastStart, FfprobeProbe, KeyDeriver, UploadPipeline, UrlSigner};
use tubely_storage::{create_local_storage, create_storage, LocalStorage, Storage};

async fn setup_repository(config: &Config) -> Result<Arc<dyn VideoRepository>> {
    match config.database_url() {
        Some(url) => {
            let pool = setup_database(config, url).await?;
            Ok(Arc::new(PgVideoRepository::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory only");
            Ok(Arc::new(InMemoryVideoRepository::new()))
        }
    }
}

async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn Storage>, Option<Arc<LocalStorage>>)> {
    match config.storage_backend() {
        StorageBackend::Local => {
            let local = create_local_storage(config)
                .await
                .context("Failed to initialize local storage")?;
            let storage: Arc<dyn Storage> = local.clone();
            Ok((storage, Some(local)))
        }
        StorageBackend::S3 => {
            let storage = create_storage(config)
                .await
                .context("Failed to initialize S3 storage")?;
            Ok((storage, None))
        }
    }
}

/// Initialize repositories, storage and the upload pipeline
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let videos = setup_repository(config).await?;
    let (storage, local_media) = setup_storage(config).await?;

    tracing::info!(
        backend = %storage.backend_type(),
        namespace = %storage.namespace(),
        "Storage initialized"
    );

    tokio::fs::create_dir_all(config.upload_tmp_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_tmp_dir().display()
            )
        })?;

    let pipeline = UploadPipeline::new(
        storage.clone(),
        Arc::new(FfprobeProbe::new(
            config.ffprobe_path(),
            config.media_tool_timeout(),
        )),
        Arc::new(FfmpegFastStart::new(
            config.ffmpeg_path(),
            config.media_tool_timeout(),
        )),
        KeyDeriver::default(),
        config.upload_tmp_dir(),
    );

    let signer = UrlSigner::new(storage.clone(), config.signed_url_ttl());
    let jwt = JwtManager::new(config.jwt_secret(), config.jwt_expiry_hours());

    Ok(Arc::new(AppState {
        config: config.clone(),
        videos,
        storage,
        local_media,
        pipeline: Arc::new(pipeline),
        signer,
        jwt: Arc::new(jwt),
    }))
}
