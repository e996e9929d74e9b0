//! Upload pipeline: decode once, fan out one task per preset, roll back on
//! failure.
//!
//! The caller sees either the full variant set or an error with nothing
//! left behind in the bucket (best effort: rollback deletes that fail are
//! logged and skipped). The work runs on a detached task, so a caller that
//! goes away mid-upload (client disconnect, request timeout) does not stop
//! it; whatever that task uploads is then rolled back.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use pura_core::image_variants::{
    decode_image, render_variant, sanitize_basename, variant_key, ImagePreset, VariantError,
    PRESETS, VARIANT_CONTENT_TYPE,
};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Mutex};
use tokio::task::{self, JoinError};

use super::{ObjectStore, ObjectStoreError};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("decode failed: {0}")]
    Decode(#[source] VariantError),

    #[error("encoding {preset} failed: {source}")]
    Encode {
        preset: &'static str,
        #[source]
        source: VariantError,
    },

    #[error("uploading {preset} failed: {source}")]
    Upload {
        preset: &'static str,
        #[source]
        source: ObjectStoreError,
    },

    #[error("worker task failed: {0}")]
    Task(String),
}

impl From<JoinError> for UploadError {
    fn from(err: JoinError) -> Self {
        UploadError::Task(err.to_string())
    }
}

/// One image as received from the client.
#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    /// Declared content type; the bytes are not sniffed.
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Unix seconds embedded in every variant key.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedVariant {
    pub key: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Preset name to uploaded variant.
pub type VariantSet = BTreeMap<&'static str, UploadedVariant>;

type Outcome = Result<VariantSet, UploadError>;

#[derive(Clone)]
pub struct UploadPipeline {
    store: Arc<dyn ObjectStore>,
}

impl UploadPipeline {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, upload: ImageUpload) -> Outcome {
        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            let outcome = process(Arc::clone(&store), upload).await;
            if let Err(Ok(abandoned)) = tx.send(outcome) {
                tracing::warn!(
                    uploaded = abandoned.len(),
                    "Upload abandoned by caller, rolling back"
                );
                rollback(store, keys_of(abandoned)).await;
            }
        });

        let mut pending = PendingUpload {
            rx,
            store: Arc::clone(&self.store),
            settled: false,
        };
        let outcome = (&mut pending.rx).await;
        pending.settled = true;
        outcome.map_err(|_| UploadError::Task("upload task ended without a result".into()))?
    }
}

/// Receiving side of a detached upload.
///
/// Dropped unsettled, it closes the channel so the task rolls back on its
/// own, and rolls back a result that was already delivered.
struct PendingUpload {
    rx: oneshot::Receiver<Outcome>,
    store: Arc<dyn ObjectStore>,
    settled: bool,
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.rx.close();
        if let Ok(Ok(delivered)) = self.rx.try_recv() {
            tracing::warn!(
                uploaded = delivered.len(),
                "Upload abandoned by caller, rolling back"
            );
            let keys = keys_of(delivered);
            match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(rollback(Arc::clone(&self.store), keys));
                }
                Err(_) => tracing::error!(?keys, "No runtime to roll back abandoned upload"),
            }
        }
    }
}

fn keys_of(set: VariantSet) -> Vec<String> {
    set.into_values().map(|v| v.key).collect()
}

async fn process(store: Arc<dyn ObjectStore>, upload: ImageUpload) -> Outcome {
    let ImageUpload {
        filename,
        content_type,
        bytes,
        timestamp,
    } = upload;

    let image = task::spawn_blocking(move || decode_image(&bytes, &content_type))
        .await?
        .map_err(UploadError::Decode)?;
    let image = Arc::new(image);
    let basename = sanitize_basename(&filename);

    let uploaded: Arc<Mutex<HashMap<&'static str, UploadedVariant>>> = Arc::default();

    let handles: Vec<_> = PRESETS
        .iter()
        .map(|preset| {
            let key = variant_key(&basename, timestamp, preset);
            tokio::spawn(render_and_put(
                Arc::clone(&store),
                Arc::clone(&image),
                *preset,
                key,
                Arc::clone(&uploaded),
            ))
        })
        .collect();

    // Every task settles before rollback so no upload lands afterwards.
    let mut first_error = None;
    for joined in join_all(handles).await {
        let outcome = joined.map_err(UploadError::from).and_then(|r| r);
        if let Err(err) = outcome {
            first_error.get_or_insert(err);
        }
    }

    let uploaded = std::mem::take(&mut *uploaded.lock().await);

    match first_error {
        None => Ok(uploaded.into_iter().collect()),
        Some(err) => {
            tracing::warn!(
                error = %err,
                filename = %filename,
                uploaded = uploaded.len(),
                "Upload failed, rolling back"
            );
            rollback(store, uploaded.into_values().map(|v| v.key).collect()).await;
            Err(err)
        }
    }
}

async fn render_and_put(
    store: Arc<dyn ObjectStore>,
    image: Arc<image::DynamicImage>,
    preset: ImagePreset,
    key: String,
    uploaded: Arc<Mutex<HashMap<&'static str, UploadedVariant>>>,
) -> Result<(), UploadError> {
    let rendered = task::spawn_blocking(move || render_variant(&image, &preset))
        .await?
        .map_err(|source| UploadError::Encode {
            preset: preset.name,
            source,
        })?;

    store
        .put(&key, rendered.bytes, VARIANT_CONTENT_TYPE)
        .await
        .map_err(|source| UploadError::Upload {
            preset: preset.name,
            source,
        })?;

    tracing::debug!(preset = preset.name, key = %key, "Variant uploaded");

    let variant = UploadedVariant {
        url: store.public_url(&key),
        key,
        width: rendered.width,
        height: rendered.height,
    };
    uploaded.lock().await.insert(preset.name, variant);
    Ok(())
}

async fn rollback(store: Arc<dyn ObjectStore>, keys: Vec<String>) {
    for key in keys {
        if let Err(err) = store.delete(&key).await {
            tracing::warn!(error = %err, key = %key, "Rollback delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use assert_matches::assert_matches;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use pura_core::image_variants::MAX_UPLOAD_BYTES;

    use super::*;
    use crate::storage::InMemoryObjectStore;

    /// Accepts `budget` puts, then fails every put.
    struct FlakyStore {
        inner: InMemoryObjectStore,
        budget: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ObjectStore for FlakyStore {
        async fn put(
            &self,
            key: &str,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<(), ObjectStoreError> {
            let granted = self
                .budget
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !granted {
                return Err(ObjectStoreError::Put {
                    key: key.to_string(),
                    message: "quota exceeded".into(),
                });
            }
            self.inner.put(key, bytes, content_type).await
        }

        async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
            self.inner.delete(key).await
        }

        fn public_url(&self, key: &str) -> String {
            self.inner.public_url(key)
        }
    }

    /// Counts successful puts, optionally after a delay.
    struct RecordingStore {
        inner: InMemoryObjectStore,
        put_delay: Duration,
        puts: AtomicUsize,
    }

    impl RecordingStore {
        fn new(inner: InMemoryObjectStore, put_delay: Duration) -> Self {
            Self {
                inner,
                put_delay,
                puts: AtomicUsize::new(0),
            }
        }

        fn puts(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for RecordingStore {
        async fn put(
            &self,
            key: &str,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<(), ObjectStoreError> {
            tokio::time::sleep(self.put_delay).await;
            self.inner.put(key, bytes, content_type).await?;
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
            self.inner.delete(key).await
        }

        fn public_url(&self, key: &str) -> String {
            self.inner.public_url(key)
        }
    }

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn upload(bytes: Vec<u8>, content_type: &str) -> ImageUpload {
        ImageUpload {
            filename: "Temple Gate.png".into(),
            content_type: content_type.into(),
            bytes,
            timestamp: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn one_variant_per_preset_never_upscaled() {
        let store = InMemoryObjectStore::new("https://cdn.test");
        let pipeline = UploadPipeline::new(Arc::new(store.clone()));

        let variants = pipeline
            .run(upload(encode(1000, 500, ImageFormat::Png), "image/png"))
            .await
            .unwrap();

        assert_eq!(variants.len(), PRESETS.len());
        for preset in PRESETS {
            let v = &variants[preset.name];
            assert_eq!(v.width, preset.width.min(1000));
            assert_eq!(v.height, v.width / 2);
            assert_eq!(
                v.key,
                format!("uploads/temple-gate_1700000000_{}.webp", preset.name)
            );
            assert_eq!(v.url, format!("https://cdn.test/{}", v.key));
        }
        assert_eq!(store.len().await, PRESETS.len());
    }

    #[tokio::test]
    async fn large_jpeg_yields_four_deterministic_keys() {
        let store = InMemoryObjectStore::new("https://cdn.test");
        let pipeline = UploadPipeline::new(Arc::new(store.clone()));

        let mut req = upload(encode(5000, 3000, ImageFormat::Jpeg), "image/jpeg");
        req.filename = "aerial.jpg".into();
        let variants = pipeline.run(req).await.unwrap();

        assert_eq!(
            store.keys().await,
            vec![
                "uploads/aerial_1700000000_desktop.webp",
                "uploads/aerial_1700000000_large.webp",
                "uploads/aerial_1700000000_mobile.webp",
                "uploads/aerial_1700000000_thumb.webp",
            ]
        );
        assert_eq!(variants["large"].width, 1920);
        assert_eq!(variants["large"].height, 1152);
        for key in store.keys().await {
            let (size, content_type) = store.describe(&key).await.unwrap();
            assert!(size < MAX_UPLOAD_BYTES);
            assert_eq!(content_type, "image/webp");
        }
    }

    #[tokio::test]
    async fn failed_upload_leaves_nothing_behind() {
        for budget in 0..PRESETS.len() {
            let inner = InMemoryObjectStore::new("https://cdn.test");
            let store = FlakyStore {
                inner: inner.clone(),
                budget: AtomicUsize::new(budget),
            };
            let pipeline = UploadPipeline::new(Arc::new(store));

            let err = pipeline
                .run(upload(encode(800, 600, ImageFormat::Png), "image/png"))
                .await
                .unwrap_err();

            assert_matches!(err, UploadError::Upload { .. });
            assert!(inner.is_empty().await, "budget {budget} left objects behind");
        }
    }

    #[tokio::test]
    async fn undecodable_bytes_upload_nothing() {
        let store = InMemoryObjectStore::new("https://cdn.test");
        let pipeline = UploadPipeline::new(Arc::new(store.clone()));

        let err = pipeline
            .run(upload(b"definitely not a jpeg".to_vec(), "image/jpeg"))
            .await
            .unwrap_err();

        assert_matches!(err, UploadError::Decode(_));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn encode_failure_rolls_back_earlier_variants() {
        // Thumb scales to 400x15619; wider presets keep 16400 rows, past
        // libwebp's 16383 limit.
        let inner = InMemoryObjectStore::new("https://cdn.test");
        let store = Arc::new(RecordingStore::new(inner.clone(), Duration::ZERO));
        let pipeline = UploadPipeline::new(store.clone());

        let err = pipeline
            .run(upload(encode(420, 16_400, ImageFormat::Png), "image/png"))
            .await
            .unwrap_err();

        assert_matches!(err, UploadError::Encode { preset, .. } if preset != "thumb");
        assert_eq!(store.puts(), 1);
        assert!(inner.is_empty().await);
    }

    #[tokio::test]
    async fn cancelled_upload_is_rolled_back() {
        let inner = InMemoryObjectStore::new("https://cdn.test");
        let store = Arc::new(RecordingStore::new(inner.clone(), Duration::from_millis(200)));
        let pipeline = UploadPipeline::new(store.clone());

        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            pipeline.run(upload(encode(800, 600, ImageFormat::Png), "image/png")),
        )
        .await;
        assert!(cancelled.is_err(), "upload should still be in flight");

        // The detached work keeps going, then removes what it stored.
        for _ in 0..100 {
            if store.puts() == PRESETS.len() && inner.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(store.puts(), PRESETS.len());
        assert!(inner.is_empty().await, "left behind: {:?}", inner.keys().await);
    }
}
