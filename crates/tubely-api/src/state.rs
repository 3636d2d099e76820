//! Application state shared by every handler.

use crate::auth::JwtManager;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{UploadPipeline, UrlSigner};
use tubely_storage::{LocalStorage, Storage};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    /// Set only for the local backend; serves `/media` and checks its signatures.
    pub local_media: Option<Arc<LocalStorage>>,
    pub pipeline: Arc<UploadPipeline>,
    pub signer: UrlSigner,
    pub jwt: Arc<JwtManager>,
}
