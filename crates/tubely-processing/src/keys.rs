//! Storage key derivation.
//!
//! Keys look like `{orientation}/{id}{ext}` where `id` is 32 random bytes in
//! unpadded URL-safe base64 and `ext` comes from the content subtype.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use std::sync::Arc;

use crate::aspect::Orientation;

const KEY_ENTROPY_BYTES: usize = 32;
const FALLBACK_EXTENSION: &str = ".bin";

/// Source of random bytes for key identifiers.
pub trait EntropySource: Send + Sync {
    fn fill(&self, buf: &mut [u8]);
}

/// Thread-local CSPRNG, seeded from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) {
        rand::rng().fill_bytes(buf);
    }
}

/// `video/mp4` → `.mp4`. Anything that is not exactly `type/subtype` with a
/// non-empty subtype maps to `.bin`.
pub fn extension_for(content_type: &str) -> String {
    let parts: Vec<&str> = content_type.split('/').collect();
    match parts.as_slice() {
        [_, subtype] if !subtype.is_empty() => format!(".{}", subtype),
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

#[derive(Clone)]
pub struct KeyDeriver {
    entropy: Arc<dyn EntropySource>,
}

impl KeyDeriver {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    pub fn derive(&self, content_type: &str, orientation: Orientation) -> String {
        let mut id = [0u8; KEY_ENTROPY_BYTES];
        self.entropy.fill(&mut id);

        format!(
            "{}{}{}",
            orientation.prefix(),
            URL_SAFE_NO_PAD.encode(id),
            extension_for(content_type)
        )
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FixedEntropy(u8);

    impl EntropySource for FixedEntropy {
        fn fill(&self, buf: &mut [u8]) {
            buf.fill(self.0);
        }
    }

    #[test]
    fn test_key_format() {
        let deriver = KeyDeriver::new(Arc::new(FixedEntropy(0)));
        let key = deriver.derive("video/mp4", Orientation::Landscape);
        assert_eq!(key, format!("landscape/{}.mp4", "A".repeat(43)));

        let deriver = KeyDeriver::new(Arc::new(FixedEntropy(0xff)));
        let key = deriver.derive("video/mp4", Orientation::Portrait);
        assert_eq!(key, format!("portrait/{}.mp4", "_".repeat(42) + "8"));
    }

    #[test]
    fn test_malformed_content_type_falls_back_to_bin() {
        let deriver = KeyDeriver::default();
        assert!(deriver.derive("bogus", Orientation::Other).ends_with(".bin"));
        assert!(deriver.derive("bogus", Orientation::Other).starts_with("other/"));
        assert_eq!(extension_for("a/b/c"), ".bin");
        assert_eq!(extension_for("video/"), ".bin");
        assert_eq!(extension_for(""), ".bin");
        assert_eq!(extension_for("video/quicktime"), ".quicktime");
    }

    #[test]
    fn test_keys_are_distinct() {
        let deriver = KeyDeriver::default();
        let keys: HashSet<String> = (0..10_000)
            .map(|_| deriver.derive("video/mp4", Orientation::Landscape))
            .collect();
        assert_eq!(keys.len(), 10_000);
    }

    #[test]
    fn test_key_is_url_safe() {
        let key = KeyDeriver::default().derive("video/mp4", Orientation::Other);
        let id = key
            .strip_prefix("other/")
            .and_then(|rest| rest.strip_suffix(".mp4"))
            .unwrap();
        assert_eq!(id.len(), 43);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
