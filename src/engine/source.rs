//! Design image acquisition

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tracing::debug;
use url::Url;

use super::error::MockupError;

/// Fetches design images into memory
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Download the image at `url`.
    ///
    /// Any failure (bad URL, network error, non-2xx, unreadable body) is a
    /// single [`MockupError::DownloadFailed`] carrying the URL.
    async fn download_image(&self, url: &str) -> Result<Bytes, MockupError>;
}

/// Downloads designs over HTTP(S).
///
/// One attempt per call, bounded by the client timeout; product creation is
/// interactive so a failed download just means no mockup.
#[derive(Clone)]
pub struct HttpImageSource {
    http_client: reqwest::Client,
    /// Bodies larger than this are rejected
    max_bytes: u64,
}

impl HttpImageSource {
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("tee-mockup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpImageSource { http_client, max_bytes })
    }
}

/// Only absolute http/https URLs are fetched
pub fn validate_url(url: &str) -> Result<Url, MockupError> {
    let parsed = Url::parse(url.trim()).map_err(|e| MockupError::download(url, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(MockupError::download(url, format!("unsupported scheme {scheme:?}"))),
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn download_image(&self, url: &str) -> Result<Bytes, MockupError> {
        let parsed = validate_url(url)?;

        debug!(url = %parsed, "Fetching design image");

        let mut response = self
            .http_client
            .get(parsed)
            .send()
            .await
            .map_err(|e| MockupError::download(url, e))?;

        if !response.status().is_success() {
            return Err(MockupError::download(url, format!("HTTP {}", response.status())));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                return Err(MockupError::download(
                    url,
                    format!("body of {} bytes exceeds limit of {}", declared, self.max_bytes),
                ));
            }
        }

        // Content-Length may be absent or wrong; enforce the cap while reading
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MockupError::download(url, e))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(MockupError::download(
                    url,
                    format!("body exceeds limit of {} bytes", self.max_bytes),
                ));
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        if bytes.is_empty() {
            return Err(MockupError::download(url, "empty body"));
        }

        debug!(url = %url, bytes = bytes.len(), "Design image downloaded");

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const LIMIT: u64 = 1024;

    /// Serve one canned HTTP response on a local port
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        serve_with(status_line, body, true).await
    }

    /// Serve one response, optionally without `Content-Length` (body ends at close)
    async fn serve_with(status_line: &'static str, body: &'static [u8], declare_length: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let length = if declare_length {
                    format!("Content-Length: {}\r\n", body.len())
                } else {
                    String::new()
                };
                let head = format!(
                    "HTTP/1.1 {}\r\n{}Content-Type: image/png\r\nConnection: close\r\n\r\n",
                    status_line, length
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/design.png", addr)
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://cdn.example.com/designs/a.png").is_ok());
        assert!(validate_url("http://localhost:9000/a.png").is_ok());
        assert!(matches!(validate_url("ftp://example.com/a.png"), Err(MockupError::DownloadFailed { .. })));
        assert!(matches!(validate_url("/relative/a.png"), Err(MockupError::DownloadFailed { .. })));
        assert!(matches!(validate_url("not a url"), Err(MockupError::DownloadFailed { .. })));
    }

    #[tokio::test]
    async fn test_download_success() {
        let url = serve_once("200 OK", b"\x89PNG fake body").await;
        let source = HttpImageSource::new(Duration::from_secs(5), LIMIT).unwrap();
        let bytes = source.download_image(&url).await.unwrap();
        assert_eq!(bytes.as_ref(), b"\x89PNG fake body");
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let url = serve_once("404 Not Found", b"missing").await;
        let source = HttpImageSource::new(Duration::from_secs(5), LIMIT).unwrap();
        match source.download_image(&url).await {
            Err(MockupError::DownloadFailed { url: failed, reason }) => {
                assert_eq!(failed, url);
                assert!(reason.contains("404"));
            }
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_fails() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpImageSource::new(Duration::from_secs(2), LIMIT).unwrap();
        let result = source.download_image(&format!("http://{}/d.png", addr)).await;
        assert!(matches!(result, Err(MockupError::DownloadFailed { .. })));
    }

    static OVERSIZED: [u8; 4096] = [7u8; 4096];

    #[tokio::test]
    async fn test_declared_oversize_body_is_rejected() {
        let url = serve_with("200 OK", &OVERSIZED, true).await;
        let source = HttpImageSource::new(Duration::from_secs(5), LIMIT).unwrap();
        match source.download_image(&url).await {
            Err(MockupError::DownloadFailed { reason, .. }) => assert!(reason.contains("exceeds limit")),
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undeclared_oversize_body_is_rejected() {
        let url = serve_with("200 OK", &OVERSIZED, false).await;
        let source = HttpImageSource::new(Duration::from_secs(5), LIMIT).unwrap();
        match source.download_image(&url).await {
            Err(MockupError::DownloadFailed { reason, .. }) => assert!(reason.contains("exceeds limit")),
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undeclared_body_within_limit() {
        let url = serve_with("200 OK", b"\x89PNG small", false).await;
        let source = HttpImageSource::new(Duration::from_secs(5), LIMIT).unwrap();
        let bytes = source.download_image(&url).await.unwrap();
        assert_eq!(&bytes[..], b"\x89PNG small");
    }
}
