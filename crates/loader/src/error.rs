use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("invalid url: {0}")]
    BadUrl(String),

    #[error("bad server response (status {status}, content type {content_type:?})")]
    BadResponse {
        status: u16,
        content_type: Option<String>,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("cache error: {0}")]
    Cache(#[from] std::io::Error),
}
