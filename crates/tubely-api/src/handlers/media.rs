//! Serves files from the local backend behind signed, expiring URLs.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tubely_core::AppError;

#[derive(Debug, Deserialize)]
pub struct SignedUrlQuery {
    pub expires: u64,
    pub signature: String,
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Response, HttpAppError> {
    let Some(local) = state.local_media.as_ref() else {
        return Err(AppError::NotFound("Media serving is not enabled".to_string()).into());
    };

    if !local.verify_signed_url(&key, query.expires, &query.signature) {
        tracing::debug!(key = %key, "Rejected media request with bad or expired signature");
        return Err(AppError::Unauthorized("Invalid or expired signature".to_string()).into());
    }

    let path = local.key_to_path(&key)?;
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("Media {} not found", key)).into());
        }
        Err(e) => return Err(AppError::from(e).into()),
    };
    let size = file.metadata().await.map_err(AppError::from)?.len();

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&key).to_string()),
        (header::CONTENT_LENGTH, size.to_string()),
        (header::CACHE_CONTROL, "private, no-store".to_string()),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
