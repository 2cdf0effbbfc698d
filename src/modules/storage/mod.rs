//! Storage module for file management
//!
//! Provides the `ObjectStore` seam the services talk to, the collision-safe
//! key scheme for uploads, and the MinIO/S3-compatible production client.

mod minio_client;

pub use minio_client::MinIOClient;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;

/// Narrow interface over the object store.
///
/// `put` returns the publicly resolvable URL of the stored object. URLs are
/// formed as `{public_endpoint}/{bucket}/{key}`, so `key_from_url` can map a
/// persisted URL back to the key it was stored under.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    async fn delete(&self, key: &str) -> Result<()>;

    fn public_url(&self, key: &str) -> String;

    fn key_from_url(&self, url: &str) -> Option<String>;
}

/// Build a collision-safe storage key: `{prefix}/{random token}_{file name}`.
///
/// The 128-bit random token guarantees two uploads of the same original
/// filename never overwrite each other. Both the report and the image upload
/// paths use this scheme.
pub fn unique_key(prefix: &str, file_name: &str) -> String {
    format!("{}/{}_{}", prefix, Uuid::new_v4(), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_key_keeps_prefix_and_filename() {
        let key = unique_key("images", "a.jpg");
        assert!(key.starts_with("images/"));
        assert!(key.ends_with("_a.jpg"));
    }

    #[test]
    fn unique_key_differs_for_same_filename() {
        let first = unique_key("images", "a.jpg");
        let second = unique_key("images", "a.jpg");
        assert_ne!(first, second);
    }

    #[test]
    fn unique_key_token_is_uuid_sized() {
        let key = unique_key("reports", "survey.pdf");
        let token = key
            .strip_prefix("reports/")
            .and_then(|rest| rest.split('_').next())
            .unwrap();
        assert_eq!(token.len(), 36);
        assert!(Uuid::parse_str(token).is_ok());
    }
}
