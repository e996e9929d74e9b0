use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::{ObjectStore, ObjectStoreError};

/// S3-compatible bucket settings.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for R2 or MinIO. `None` uses AWS.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Base URL objects are served from, e.g. a CDN domain.
    pub public_url: String,
}

impl S3Config {
    /// Load from environment variables.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `S3_BUCKET`            | required |
    /// | `S3_REGION`            | `auto`  |
    /// | `S3_ENDPOINT`          | unset   |
    /// | `S3_ACCESS_KEY_ID`     | unset   |
    /// | `S3_SECRET_ACCESS_KEY` | unset   |
    /// | `S3_PUBLIC_URL`        | required |
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            bucket: non_empty("S3_BUCKET").expect("S3_BUCKET must be set"),
            region: non_empty("S3_REGION").unwrap_or_else(|| "auto".into()),
            endpoint: non_empty("S3_ENDPOINT"),
            access_key_id: non_empty("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty("S3_SECRET_ACCESS_KEY"),
            public_url: non_empty("S3_PUBLIC_URL").expect("S3_PUBLIC_URL must be set"),
        }
    }
}

/// Object store backed by an S3-compatible bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_url: String,
}

impl S3ObjectStore {
    /// Build a client. Explicit keys win; otherwise the default AWS
    /// credential chain is used.
    pub async fn connect(config: S3Config) -> Result<Self, ObjectStoreError> {
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .force_path_style(true);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) => {
                builder = builder
                    .credentials_provider(Credentials::new(key, secret, None, None, "pura-env"));
            }
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .load()
                    .await;
                let provider = shared.credentials_provider().ok_or_else(|| {
                    ObjectStoreError::Config(
                        "no credentials: set S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY".into(),
                    )
                })?;
                builder = builder.credentials_provider(provider);
            }
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
            public_url: config.public_url,
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Put {
                key: key.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(e).to_string(),
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Delete {
                key: key.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(e).to_string(),
            })?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_url.trim_end_matches('/'))
    }
}
