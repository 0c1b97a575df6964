//! Background fetches driven from a UI thread.
//!
//! Work runs on a tokio runtime; results come back through an [`Inbox`]
//! the frontend drains once per frame, so UI state is only ever touched
//! from the UI thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use story_deck_core::model::StoryMetadata;
use story_deck_protocol::ElementKey;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use url::Url;

use crate::error::LoaderError;
use crate::loader::ResourceLoader;
use crate::transport::{ReqwestTransport, Transport};

/// Holds at most one in-flight task. Replacing or dropping the slot
/// aborts the task it held.
#[derive(Debug, Default)]
pub struct FetchSlot {
    handle: Option<JoinHandle<()>>,
}

impl FetchSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for FetchSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Multi-producer queue drained on the UI thread.
#[derive(Debug)]
pub struct Inbox<M> {
    tx: UnboundedSender<M>,
    rx: UnboundedReceiver<M>,
}

impl<M> Default for Inbox<M> {
    fn default() -> Self {
        let (tx, rx) = unbounded_channel();
        Self { tx, rx }
    }
}

impl<M> Inbox<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> UnboundedSender<M> {
        self.tx.clone()
    }

    /// Everything queued so far, without waiting.
    pub fn drain(&mut self) -> Vec<M> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

#[derive(Debug)]
pub enum FetchResult {
    Metadata(Result<Vec<StoryMetadata>, LoaderError>),
    Image {
        key: ElementKey,
        result: Result<Bytes, LoaderError>,
    },
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Schedules listing and per-tile image fetches.
pub struct Fetcher<T: Transport = ReqwestTransport> {
    runtime: Handle,
    loader: Arc<ResourceLoader<T>>,
    metadata: FetchSlot,
    images: HashMap<ElementKey, FetchSlot>,
    inbox: Inbox<FetchResult>,
    waker: Option<Waker>,
}

impl<T: Transport> fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("metadata", &self.metadata)
            .field("images", &self.images.len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(runtime: Handle, loader: Arc<ResourceLoader<T>>) -> Self {
        Self {
            runtime,
            loader,
            metadata: FetchSlot::new(),
            images: HashMap::new(),
            inbox: Inbox::new(),
            waker: None,
        }
    }

    /// Called after every delivered result, e.g. to request a repaint.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    pub fn loader(&self) -> &ResourceLoader<T> {
        &self.loader
    }

    pub fn is_fetching_metadata(&self) -> bool {
        self.metadata.is_running()
    }

    /// Start fetching the listing, replacing any fetch in flight.
    pub fn fetch_metadata(&mut self, endpoint: impl Into<String>) {
        let endpoint = endpoint.into();
        let loader = Arc::clone(&self.loader);
        let tx = self.inbox.sender();
        let waker = self.waker.clone();
        let handle = self.runtime.spawn(async move {
            let result = loader.fetch_metadata(&endpoint).await;
            if tx.send(FetchResult::Metadata(result)).is_ok() {
                if let Some(waker) = waker {
                    waker();
                }
            }
        });
        self.metadata.replace(handle);
    }

    /// Bytes for `key` if cached; otherwise start a fetch (replacing any
    /// earlier one for the same key) and return `None`.
    pub fn fetch_image(&mut self, key: ElementKey, url: &Url) -> Option<Bytes> {
        if let Some(bytes) = self.loader.cached_bytes(url) {
            return Some(bytes);
        }
        let loader = Arc::clone(&self.loader);
        let tx = self.inbox.sender();
        let waker = self.waker.clone();
        let url = url.clone();
        let task_key = key.clone();
        let handle = self.runtime.spawn(async move {
            let result = loader.fetch_bytes(&url).await;
            if let Err(err) = &result {
                tracing::warn!(key = %task_key, %url, %err, "image fetch failed");
            }
            if tx.send(FetchResult::Image { key: task_key, result }).is_ok() {
                if let Some(waker) = waker {
                    waker();
                }
            }
        });
        self.images.entry(key).or_default().replace(handle);
        None
    }

    pub fn is_fetching_image(&self, key: &ElementKey) -> bool {
        self.images.get(key).is_some_and(FetchSlot::is_running)
    }

    /// Abort the image fetch for a tile that went away.
    pub fn cancel_image(&mut self, key: &ElementKey) {
        self.images.remove(key);
    }

    /// Results delivered since the last call. Finished image slots are
    /// released.
    pub fn drain(&mut self) -> Vec<FetchResult> {
        let results = self.inbox.drain();
        self.images.retain(|_, slot| slot.is_running());
        results
    }
}
