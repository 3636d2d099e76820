use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::handlers::videos::load_owned_video;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::{AppError, VideoResponse};
use uuid::Uuid;

/// Attach media to an existing draft.
///
/// Ownership is settled before the body is read, so rejected callers cost no
/// disk or tool time. The stored blob is removed again if the record cannot
/// be updated.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<VideoResponse>), HttpAppError> {
    let mut video = load_owned_video(&state, video_id, user.user_id).await?;

    let mut stored = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let reference = state
            .pipeline
            .process_upload(field, &content_type, state.config.max_video_size_bytes())
            .await?;
        stored = Some(reference);
        break;
    }

    let reference = stored.ok_or_else(|| {
        AppError::InvalidInput(format!("Missing multipart field '{}'", VIDEO_FORM_FIELD))
    })?;

    video.video_url = Some(reference.encode());
    video.updated_at = Utc::now();

    let updated = match state.videos.update_video(&video).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Err(cleanup_err) = state.storage.delete(reference.key()).await {
                tracing::warn!(
                    error = %cleanup_err,
                    key = %reference.key(),
                    "Failed to remove stored video after record update failed"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        video_id = %video_id,
        user_id = %user.user_id,
        reference = %reference,
        "Video uploaded"
    );

    let response = state.signer.sign_video(updated).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
