use std::future::Future;

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::LoaderError;

/// A completed HTTP exchange, reduced to what the loader inspects.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The content type without parameters, lowercased
    /// (`"application/json; charset=utf-8"` -> `"application/json"`).
    pub fn mime_type(&self) -> Option<String> {
        let raw = self.content_type.as_deref()?;
        let mime = raw.split(';').next().unwrap_or(raw).trim();
        (!mime.is_empty()).then(|| mime.to_ascii_lowercase())
    }

    pub(crate) fn bad_response(&self) -> LoaderError {
        LoaderError::BadResponse {
            status: self.status,
            content_type: self.content_type.clone(),
        }
    }
}

/// Issues GET requests. Implemented over `reqwest`; tests substitute a fake.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &Url) -> impl Future<Output = Result<HttpResponse, LoaderError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Requests run without a client-side timeout; reqwest's defaults apply.
    pub fn new() -> Result<Self, LoaderError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LoaderError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, LoaderError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LoaderError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| LoaderError::Transport(e.to_string()))?;
        tracing::debug!(%url, status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>) -> HttpResponse {
        HttpResponse {
            status,
            content_type: content_type.map(str::to_owned),
            body: Bytes::new(),
        }
    }

    #[test]
    fn success_range() {
        assert!(response(200, None).is_success());
        assert!(response(299, None).is_success());
        assert!(!response(199, None).is_success());
        assert!(!response(300, None).is_success());
        assert!(!response(404, None).is_success());
    }

    #[test]
    fn client_builds_with_transport_defaults() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[test]
    fn mime_type_strips_parameters() {
        assert_eq!(
            response(200, Some("Application/JSON; charset=utf-8")).mime_type().as_deref(),
            Some("application/json")
        );
        assert_eq!(response(200, Some("")).mime_type(), None);
        assert_eq!(response(200, None).mime_type(), None);
    }
}
