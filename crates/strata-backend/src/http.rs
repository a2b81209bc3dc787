use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

/// A completed HTTP exchange. Adapters decide what a given status means;
/// the client only surfaces transport-level failures as errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),
}

/// Minimal HTTP surface the adapters need.
///
/// Implementations handle their own redirect following and connection
/// pooling. The per-call timeout bounds a single attempt independently of
/// any retry loop above it, so one hung request cannot stall a whole batch.
pub trait HttpClient: Send + Sync {
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;

    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Bytes,
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

/// Production client backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpError> {
        let send = async {
            let response = request
                .send()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?;
            Ok(HttpResponse { status, body })
        };
        tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| HttpError::Timeout(timeout))?
    }
}

impl HttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.get(url);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        self.execute(request, timeout).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Bytes,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.post(url).body(body);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        self.execute(request, timeout).await
    }
}
