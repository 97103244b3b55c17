use crate::cache::{CachedResult, ResultCache};
use crate::clients::{ImageHost, MediaSource, ARTWORK_FIT};
use crate::error::Result;
use std::sync::{Arc, Mutex};

/// Resolves an artwork key to a hosted image URL, memoized
///
/// Bytes come from the media source, land in a transient file, and go up to
/// the image host; the hosted URL is cached together with its deletion
/// handle. When the cache displaces such an entry the remote upload is
/// deleted best-effort.
pub struct ArtworkResolver {
    media: Arc<dyn MediaSource>,
    host: Arc<dyn ImageHost>,
    cache: Arc<Mutex<ResultCache>>,
}

impl ArtworkResolver {
    pub fn new(media: Arc<dyn MediaSource>, host: Arc<dyn ImageHost>, cache_limit: usize) -> Self {
        Self {
            media,
            host,
            cache: Arc::new(Mutex::new(ResultCache::new(cache_limit))),
        }
    }

    /// Resolve an image key to a hosted URL, `""` meaning "known unavailable"
    ///
    /// Fetch failures resolve to the empty sentinel rather than erroring; an
    /// upload failure is surfaced so the publisher can fall back.
    pub async fn resolve(&self, image_key: &str) -> Result<String> {
        if image_key.is_empty() {
            return Ok(String::new());
        }
        if let Some(hit) = self.cached(image_key) {
            return Ok(hit);
        }

        tracing::debug!(image_key, "fetching artwork");
        let bytes = match self.media.fetch_image(image_key, ARTWORK_FIT).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                tracing::warn!(image_key, "media source returned no artwork bytes");
                self.store(image_key, CachedResult::empty()).await;
                return Ok(String::new());
            }
            Err(e) => {
                tracing::warn!(image_key, "artwork fetch failed: {e}");
                self.store(image_key, CachedResult::empty()).await;
                return Ok(String::new());
            }
        };

        // transient file for the upload client; removed on drop
        let tmp = tempfile::NamedTempFile::new()?;
        tokio::fs::write(tmp.path(), &bytes).await?;

        tracing::debug!(image_key, "uploading artwork");
        let uploaded = self.host.upload(tmp.path()).await?;
        tracing::info!(image_key, url = %uploaded.url, "artwork hosted");

        self.store(
            image_key,
            CachedResult::new(uploaded.url.clone(), Some(uploaded.delete_handle)),
        )
        .await;
        Ok(uploaded.url)
    }

    fn cached(&self, image_key: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap()
            .get(image_key)
            .map(|r| r.value.clone())
    }

    /// Insert a binding, deleting the remote upload displaced by it
    ///
    /// Deletion failures are logged and swallowed: a dangling upload is
    /// acceptable, an unbounded cache is not.
    async fn store(&self, image_key: &str, result: CachedResult) {
        let evicted = self.cache.lock().unwrap().insert(image_key, result);
        if let Some(handle) = evicted.and_then(|e| e.delete_handle) {
            if let Err(e) = self.host.delete(&handle).await {
                tracing::warn!("failed to delete evicted upload: {e}");
            }
        }
    }
}
