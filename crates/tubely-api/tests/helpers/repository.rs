use async_trait::async_trait;
use tubely_core::{AppError, Video};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use uuid::Uuid;

/// In-memory records whose updates always fail, as if the database went
/// away between the blob write and the record write.
#[derive(Default)]
pub struct FailingUpdateRepository {
    inner: InMemoryVideoRepository,
}

#[async_trait]
impl VideoRepository for FailingUpdateRepository {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        self.inner.create_video(video).await
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        self.inner.get_video(id).await
    }

    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        self.inner.list_videos(user_id).await
    }

    async fn update_video(&self, _video: &Video) -> Result<Video, AppError> {
        Err(AppError::from(sqlx::Error::PoolClosed))
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.delete_video(id).await
    }
}
