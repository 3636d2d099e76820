//! Configuration module
//!
//! Server, database, storage and media tool settings, read from the
//! environment (and an optional `.env` file) at startup.

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_MAX_VIDEO_SIZE_BYTES, DEFAULT_MEDIA_TOOL_TIMEOUT_SECS, DEFAULT_SIGNED_URL_TTL_SECS,
    MAX_SIGNED_URL_TTL_SECS,
};
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const MIN_SECRET_LEN: usize = 32;
const DEFAULT_LOCAL_NAMESPACE: &str = "local";

/// Settings shared by every deployment regardless of storage backend
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    /// When unset the service keeps video records in memory.
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_namespace: String,
    pub url_signing_secret: String,
    pub signed_url_ttl_secs: u64,
    pub max_video_size_bytes: usize,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub media_tool_timeout_secs: u64,
    pub upload_tmp_dir: PathBuf,
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?;

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: jwt_secret.clone(),
            jwt_expiry_hours: parse_or("JWT_EXPIRY_HOURS", JWT_EXPIRY_HOURS),
            environment,
        };

        let storage_backend = match non_empty("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let config = Config {
            base,
            database_url: non_empty("DATABASE_URL"),
            storage_backend,
            s3_bucket: non_empty("S3_BUCKET"),
            s3_region: non_empty("S3_REGION").or_else(|| non_empty("AWS_REGION")),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            local_storage_namespace: non_empty("LOCAL_STORAGE_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_LOCAL_NAMESPACE.to_string()),
            url_signing_secret: non_empty("URL_SIGNING_SECRET").unwrap_or(jwt_secret),
            signed_url_ttl_secs: parse_or("SIGNED_URL_TTL_SECS", DEFAULT_SIGNED_URL_TTL_SECS),
            max_video_size_bytes: parse_or("MAX_VIDEO_SIZE_BYTES", DEFAULT_MAX_VIDEO_SIZE_BYTES),
            ffmpeg_path: non_empty("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: non_empty("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            media_tool_timeout_secs: parse_or(
                "MEDIA_TOOL_TIMEOUT_SECS",
                DEFAULT_MEDIA_TOOL_TIMEOUT_SECS,
            ),
            upload_tmp_dir: non_empty("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.url_signing_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "URL_SIGNING_SECRET must be at least 32 characters long"
            ));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(url) = &self.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_BYTES must be positive"));
        }

        if self.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("SIGNED_URL_TTL_SECS must be positive"));
        }

        if self.signed_url_ttl_secs > MAX_SIGNED_URL_TTL_SECS {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_TTL_SECS must be at most {} (7 days)",
                MAX_SIGNED_URL_TTL_SECS
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                if self.local_storage_namespace.contains(',') {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_NAMESPACE must not contain a comma"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.base.jwt_expiry_hours
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.base.db_timeout_seconds
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    pub fn local_storage_namespace(&self) -> &str {
        &self.local_storage_namespace
    }

    pub fn url_signing_secret(&self) -> &str {
        &self.url_signing_secret
    }

    pub fn signed_url_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.signed_url_ttl_secs)
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.max_video_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.ffprobe_path
    }

    pub fn media_tool_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.media_tool_timeout_secs)
    }

    pub fn upload_tmp_dir(&self) -> &std::path::Path {
        &self.upload_tmp_dir
    }
}
