//! Persisted pointer from a video record to its blob.
//!
//! The record column stores a single string `{namespace},{key}`. Decoding is
//! lenient: anything that does not split into exactly two non-empty fields is
//! not a reference and callers pass it through untouched.

use std::fmt::{Display, Formatter, Result as FmtResult};

const DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredVideoReference {
    namespace: String,
    key: String,
}

impl StoredVideoReference {
    /// Returns `None` when either part is empty or contains the delimiter.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Option<Self> {
        let namespace = namespace.into();
        let key = key.into();
        if namespace.is_empty()
            || key.is_empty()
            || namespace.contains(DELIMITER)
            || key.contains(DELIMITER)
        {
            return None;
        }
        Some(Self { namespace, key })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn encode(&self) -> String {
        format!("{}{}{}", self.namespace, DELIMITER, self.key)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let mut parts = raw.split(DELIMITER);
        let namespace = parts.next()?;
        let key = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Self::new(namespace, key)
    }
}

impl Display for StoredVideoReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_joins_with_comma() {
        let reference = StoredVideoReference::new("tubely-videos", "landscape/abc.mp4").unwrap();
        assert_eq!(reference.encode(), "tubely-videos,landscape/abc.mp4");
        assert_eq!(reference.to_string(), reference.encode());
    }

    #[test]
    fn test_decode_well_formed() {
        let reference = StoredVideoReference::decode("bucket,portrait/xyz.mp4").unwrap();
        assert_eq!(reference.namespace(), "bucket");
        assert_eq!(reference.key(), "portrait/xyz.mp4");
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        assert!(StoredVideoReference::decode("").is_none());
        assert!(StoredVideoReference::decode("https://cdn.example.com/v.mp4").is_none());
        assert!(StoredVideoReference::decode("a,b,c").is_none());
        assert!(StoredVideoReference::decode(",key").is_none());
        assert!(StoredVideoReference::decode("bucket,").is_none());
    }

    #[test]
    fn test_new_rejects_delimiter_in_parts() {
        assert!(StoredVideoReference::new("a,b", "key").is_none());
        assert!(StoredVideoReference::new("bucket", "k,ey").is_none());
    }
}
