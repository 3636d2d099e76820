//! Tubely Processing Library
//!
//! The video upload pipeline and its helpers:
//! - [`MediaProbe`] reads stream geometry with ffprobe
//! - [`Orientation::classify`] buckets geometry by aspect ratio
//! - [`FastStartTranscoder`] remuxes with ffmpeg for progressive playback
//! - [`KeyDeriver`] builds unguessable, orientation-prefixed storage keys
//! - [`UploadPipeline`] sequences the above and pushes the result to storage
//! - [`UrlSigner`] turns stored references into expiring URLs
//!
//! External tools sit behind traits so tests can swap in fakes.

pub mod aspect;
pub mod command;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod probe;
pub mod scratch;
pub mod signer;
pub mod transcode;

pub use aspect::{Orientation, StreamGeometry};
pub use error::ProcessingError;
pub use keys::{EntropySource, KeyDeriver, OsEntropy};
pub use pipeline::UploadPipeline;
pub use probe::{FfprobeProbe, MediaProbe};
pub use scratch::ScratchFiles;
pub use signer::UrlSigner;
pub use transcode::{faststart_output_path, FastStartTranscoder, FfmpegFastStart};
