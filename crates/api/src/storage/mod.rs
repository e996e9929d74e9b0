//! Object storage for uploaded image variants.
//!
//! [`S3ObjectStore`] talks to any S3-compatible service (R2, MinIO, AWS);
//! [`InMemoryObjectStore`] backs tests and local runs.

pub mod memory;
pub mod pipeline;
pub mod s3;

pub use self::memory::InMemoryObjectStore;
pub use self::s3::{S3Config, S3ObjectStore};

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("failed to put '{key}': {message}")]
    Put { key: String, message: String },

    #[error("failed to delete '{key}': {message}")]
    Delete { key: String, message: String },

    #[error("object store misconfigured: {0}")]
    Config(String),
}

#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), ObjectStoreError>;

    /// Remove `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;

    /// Public URL the frontend uses to fetch `key`.
    fn public_url(&self, key: &str) -> String;
}
