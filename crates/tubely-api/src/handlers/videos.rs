use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tubely_core::{AppError, Video, VideoResponse};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Load a record and make sure `user_id` owns it. A missing record is a 404
/// regardless of who asks.
pub(crate) async fn load_owned_video(
    state: &AppState,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, HttpAppError> {
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if !video.is_owned_by(user_id) {
        tracing::debug!(video_id = %video_id, user_id = %user_id, "Caller does not own video");
        return Err(AppError::Unauthorized("Not the owner of this video".to_string()).into());
    }

    Ok(video)
}

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), HttpAppError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()).into());
    }

    let video = Video::new(user.user_id, title.to_string(), body.description);
    let created = state.videos.create_video(&video).await?;

    tracing::info!(video_id = %created.id, user_id = %user.user_id, "Video draft created");

    Ok((StatusCode::CREATED, Json(VideoResponse::from(created))))
}

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<VideoResponse>>, HttpAppError> {
    let videos = state.videos.list_videos(user.user_id).await?;

    let mut responses = Vec::with_capacity(videos.len());
    for video in videos {
        responses.push(state.signer.sign_video(video).await?);
    }

    Ok(Json(responses))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<Uuid>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = load_owned_video(&state, video_id, user.user_id).await?;
    Ok(Json(state.signer.sign_video(video).await?))
}

pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    let video = load_owned_video(&state, video_id, user.user_id).await?;

    if !state.videos.delete_video(video_id).await? {
        return Err(AppError::NotFound(format!("Video {} not found", video_id)).into());
    }

    // Blobs in other namespaces belong to other deployments; leave them alone.
    if let Some(reference) = video.stored_reference() {
        if reference.namespace() == state.storage.namespace() {
            if let Err(e) = state.storage.delete(reference.key()).await {
                tracing::warn!(
                    error = %e,
                    video_id = %video_id,
                    key = %reference.key(),
                    "Failed to delete stored video after record removal"
                );
            }
        }
    }

    tracing::info!(video_id = %video_id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}
