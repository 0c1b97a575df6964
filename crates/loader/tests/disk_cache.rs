//! Integration test: a response stored by one loader is served from disk by
//! a fresh loader sharing the cache directory, without touching the network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use story_deck_loader::{HttpResponse, LoaderError, ResourceLoader, ResponseCache, Transport};
use url::Url;

#[derive(Clone, Default)]
struct CountingTransport {
    calls: Arc<AtomicUsize>,
}

impl Transport for CountingTransport {
    async fn get(&self, _url: &Url) -> Result<HttpResponse, LoaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse {
            status: 200,
            content_type: Some("image/jpeg".to_string()),
            body: Bytes::from_static(b"\xff\xd8\xff\xe0 thumbnail"),
        })
    }
}

#[tokio::test]
async fn fresh_loader_reads_previous_session_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = Url::parse("https://picsum.photos/id/42/150/150").expect("url");
    let transport = CountingTransport::default();

    let first = ResourceLoader::new(
        transport.clone(),
        ResponseCache::with_disk(1_000, dir.path(), 10_000).expect("cache"),
    );
    let stored = first.fetch_bytes(&url).await.expect("first fetch");
    drop(first);

    let second = ResourceLoader::new(
        transport.clone(),
        ResponseCache::with_disk(1_000, dir.path(), 10_000).expect("cache"),
    );
    assert_eq!(second.cached_bytes(&url), Some(stored.clone()));
    let again = second.fetch_bytes(&url).await.expect("second fetch");

    assert_eq!(again, stored);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn memory_only_loader_forgets_between_sessions() {
    let url = Url::parse("https://picsum.photos/id/1/150/150").expect("url");
    let transport = CountingTransport::default();

    for _ in 0..2 {
        let loader = ResourceLoader::new(transport.clone(), ResponseCache::in_memory(1_000));
        loader.fetch_bytes(&url).await.expect("fetch");
    }
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}
