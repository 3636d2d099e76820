//! Test helpers: build AppState and router for integration tests.
//!
//! Media tools are replaced by fakes, records live in memory and blobs go to
//! a local storage root inside a temporary directory.

#![allow(dead_code)]

pub mod auth;
pub mod media;
pub mod repository;

use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtManager;
use tubely_api::setup::routes;
use tubely_api::AppState;
use tubely_core::constants::API_PREFIX;
use tubely_core::{BaseConfig, Config, StorageBackend};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{KeyDeriver, StreamGeometry, UploadPipeline, UrlSigner};
use tubely_storage::{LocalStorage, Storage};

pub const TEST_SECRET: &str = "test-secret-at-least-32-characters-long";
pub const MEDIA_BASE_URL: &str = "http://localhost:8091/media";
pub const LOCAL_NAMESPACE: &str = "local";

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
    pub storage_dir: PathBuf,
    pub work_dir: PathBuf,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token_for(&self, user_id: uuid::Uuid) -> String {
        self.state.jwt.issue(user_id).expect("issue token")
    }

    /// Files left in the upload working directory.
    pub fn work_dir_entries(&self) -> usize {
        count_files(&self.work_dir)
    }

    /// Files written to the local blob store.
    pub fn stored_blobs(&self) -> usize {
        count_files(&self.storage_dir)
    }
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

pub struct TestOptions {
    pub geometry: StreamGeometry,
    pub max_video_size_bytes: usize,
    /// Record store override; defaults to a fresh in-memory repository.
    pub videos: Option<Arc<dyn VideoRepository>>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            geometry: StreamGeometry::new(1920, 1080),
            max_video_size_bytes: 1024 * 1024,
            videos: None,
        }
    }
}

pub fn create_test_config(temp_dir: &Path, max_video_size_bytes: usize) -> Config {
    Config {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 30,
            jwt_secret: TEST_SECRET.to_string(),
            jwt_expiry_hours: 1,
            environment: "test".to_string(),
        },
        database_url: None,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: Some(temp_dir.join("assets").display().to_string()),
        local_storage_base_url: Some(MEDIA_BASE_URL.to_string()),
        local_storage_namespace: LOCAL_NAMESPACE.to_string(),
        url_signing_secret: TEST_SECRET.to_string(),
        signed_url_ttl_secs: 900,
        max_video_size_bytes,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        media_tool_timeout_secs: 5,
        upload_tmp_dir: temp_dir.join("uploads"),
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(temp_dir.path(), options.max_video_size_bytes);
    let storage_dir = temp_dir.path().join("assets");
    let work_dir = config.upload_tmp_dir().to_path_buf();
    std::fs::create_dir_all(&work_dir).expect("create work dir");

    let local = Arc::new(
        LocalStorage::new(
            &storage_dir,
            MEDIA_BASE_URL.to_string(),
            LOCAL_NAMESPACE.to_string(),
            TEST_SECRET.as_bytes().to_vec(),
        )
        .await
        .expect("Failed to create local storage"),
    );
    let storage: Arc<dyn Storage> = local.clone();

    let pipeline = UploadPipeline::new(
        storage.clone(),
        Arc::new(media::FixedProbe(options.geometry)),
        Arc::new(media::CopyingTranscoder),
        KeyDeriver::default(),
        &work_dir,
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        videos: options
            .videos
            .unwrap_or_else(|| Arc::new(InMemoryVideoRepository::new())),
        storage: storage.clone(),
        local_media: Some(local),
        pipeline: Arc::new(pipeline),
        signer: UrlSigner::new(storage, config.signed_url_ttl()),
        jwt: Arc::new(JwtManager::new(TEST_SECRET, 1)),
    });

    let router = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
        storage_dir,
        work_dir,
    }
}
