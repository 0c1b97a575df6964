use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use story_deck_core::model::StoryMetadata;
use url::Url;

use crate::cache::{CacheKey, ResponseCache};
use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::transport::{ReqwestTransport, Transport};

const JSON_MIME: &str = "application/json";

/// Fetches listings and resource bytes, serving repeated resource requests
/// from a [`ResponseCache`].
#[derive(Debug)]
pub struct ResourceLoader<T = ReqwestTransport> {
    transport: T,
    cache: Mutex<ResponseCache>,
}

impl ResourceLoader<ReqwestTransport> {
    /// Build a loader over HTTP. If the disk tier cannot be created the
    /// loader falls back to memory only.
    pub fn from_config(config: &LoaderConfig) -> Result<Self, LoaderError> {
        let transport = ReqwestTransport::new()?;
        let cache = match config.resolved_cache_dir() {
            Some(dir) if config.disk_capacity > 0 => {
                ResponseCache::with_disk(config.memory_capacity, &dir, config.disk_capacity)
                    .unwrap_or_else(|err| {
                        tracing::warn!(dir = %dir.display(), %err, "disk cache unavailable");
                        ResponseCache::in_memory(config.memory_capacity)
                    })
            }
            _ => ResponseCache::in_memory(config.memory_capacity),
        };
        Ok(Self::new(transport, cache))
    }
}

impl<T: Transport> ResourceLoader<T> {
    pub fn new(transport: T, cache: ResponseCache) -> Self {
        Self {
            transport,
            cache: Mutex::new(cache),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        // A panic mid-insert leaves the cache usable; keep serving it.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// GET a JSON document. Fails with `BadResponse` unless the status is
    /// 2xx and the content type is `application/json`.
    pub async fn fetch_json<D: DeserializeOwned>(&self, url: &Url) -> Result<D, LoaderError> {
        let response = self.transport.get(url).await?;
        if !response.is_success() || response.mime_type().as_deref() != Some(JSON_MIME) {
            tracing::warn!(%url, status = response.status, content_type = ?response.content_type, "rejected response");
            return Err(response.bad_response());
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// The story listing at `endpoint`.
    pub async fn fetch_metadata(&self, endpoint: &str) -> Result<Vec<StoryMetadata>, LoaderError> {
        let url = Url::parse(endpoint).map_err(|e| LoaderError::BadUrl(format!("{endpoint}: {e}")))?;
        let stories: Vec<StoryMetadata> = self.fetch_json(&url).await?;
        tracing::info!(%url, count = stories.len(), "story metadata loaded");
        Ok(stories)
    }

    /// Synchronous cache lookup.
    pub fn cached_bytes(&self, url: &Url) -> Option<Bytes> {
        self.cache().get(&CacheKey::for_url(url))
    }

    /// Resource bytes, from the cache when present. Successful responses
    /// are stored before returning.
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Bytes, LoaderError> {
        let key = CacheKey::for_url(url);
        if let Some(body) = self.cache().get(&key) {
            return Ok(body);
        }
        tracing::debug!(%url, "cache miss");

        let response = self.transport.get(url).await?;
        if !response.is_success() {
            tracing::warn!(%url, status = response.status, "resource request failed");
            return Err(response.bad_response());
        }
        let body = response.body;
        if let Err(err) = self.cache().put(key, body.clone()) {
            tracing::warn!(%url, %err, "failed to persist response");
        }
        Ok(body)
    }
}
