/// Prefix shared by every JSON API route.
pub const API_PREFIX: &str = "/api";

/// The only content type accepted by the upload pipeline.
pub const ACCEPTED_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Multipart field carrying the uploaded video.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Issuer stamped into and required from bearer tokens.
pub const JWT_ISSUER: &str = "tubely";

pub const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 1 << 30;
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 15 * 60;

/// Longest lifetime S3 accepts for a presigned URL (7 days).
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_MEDIA_TOOL_TIMEOUT_SECS: u64 = 300;
