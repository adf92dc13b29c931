use crate::error::{Result, WalkerError};
use crate::model::Source;
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Upper bound on simultaneous file downloads within one fetch.
    pub max_concurrent_downloads: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("gowalker/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_concurrent_downloads: 10,
        }
    }
}

/// Shared HTTP fetcher used by every hosting-service strategy.
///
/// Holds one pooled [`Client`]. After a crawl cycle the orchestrator calls
/// [`HttpFetcher::close_idle_connections`], which swaps in a fresh client so
/// the pool of the previous cycle is dropped once in-flight requests finish.
///
/// # Examples
///
/// ```no_run
/// use gowalker_core::http::{HttpConfig, HttpFetcher};
///
/// # async fn example() -> gowalker_core::error::Result<()> {
/// let http = HttpFetcher::new(HttpConfig::default())?;
/// let body = http.get_bytes("https://example.com/a.go", None).await?;
/// println!("fetched {} bytes", body.len());
/// http.close_idle_connections()?;
/// # Ok(())
/// # }
/// ```
pub struct HttpFetcher {
    client: RwLock<Client>,
    config: HttpConfig,
    generation: AtomicU64,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            client: RwLock::new(client),
            config,
            generation: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn client(&self) -> Client {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the pooled client with a new one.
    pub fn close_idle_connections(&self) -> Result<()> {
        let fresh = build_client(&self.config)?;
        *self.client.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(generation, "recycled HTTP client");
        Ok(())
    }

    /// Number of times the client has been recycled.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Sends a GET request and returns the response status and body.
    ///
    /// Unlike [`get_bytes`](Self::get_bytes) a non-success status is not an
    /// error here; callers that check URLs decide what the status means.
    pub async fn get_with_status(&self, url: &str) -> Result<(StatusCode, Bytes)> {
        tracing::debug!("GET {}", url);
        let response = self
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| WalkerError::remote(url, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| WalkerError::remote(url, e))?;
        Ok((status, body))
    }

    /// Fetches `url` and returns the body.
    ///
    /// # Errors
    ///
    /// Returns `WalkerError::HttpStatus` for any non-2xx status (404 is
    /// classified as not-found by [`WalkerError::is_not_found`]) and
    /// `WalkerError::Remote` for transport failures.
    pub async fn get_bytes(&self, url: &str, headers: Option<&HeaderMap>) -> Result<Bytes> {
        tracing::debug!("GET {}", url);
        let mut request = self.client().get(url);
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| WalkerError::remote(url, e))?;

        if !response.status().is_success() {
            return Err(WalkerError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| WalkerError::remote(url, e))
    }

    /// Fetches `url` and decodes the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<T> {
        let body = self.get_bytes(url, headers).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Downloads the content of every file from its raw URL.
    ///
    /// At most `max_concurrent_downloads` requests are in flight at once.
    /// The first failure aborts the whole batch and is returned wrapped in
    /// `WalkerError::FetchFile`; no partial result is kept.
    pub async fn fetch_files(&self, files: &mut [Source], headers: Option<&HeaderMap>) -> Result<()> {
        let requests: Vec<(usize, String, String)> = files
            .iter()
            .enumerate()
            .map(|(i, f)| (i, f.name.clone(), f.raw_url.clone()))
            .collect();

        let bodies: Vec<(usize, Bytes)> = stream::iter(requests)
            .map(|(i, name, url)| async move {
                self.get_bytes(&url, headers)
                    .await
                    .map(|body| (i, body))
                    .map_err(|e| WalkerError::FetchFile {
                        name,
                        source: Box::new(e),
                    })
            })
            .buffer_unordered(self.config.max_concurrent_downloads.max(1))
            .try_collect()
            .await?;

        for (i, body) in bodies {
            files[i].data = body.to_vec();
        }
        Ok(())
    }
}

fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .build()
        .map_err(|e| WalkerError::remote("client", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_recycle_bumps_generation() {
        let http = fetcher();
        assert_eq!(http.generation(), 0);
        http.close_idle_connections().unwrap();
        http.close_idle_connections().unwrap();
        assert_eq!(http.generation(), 2);
    }

    #[tokio::test]
    async fn test_get_bytes() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/a.go")
            .with_status(200)
            .with_body("package a")
            .create_async()
            .await;

        let body = fetcher()
            .get_bytes(&format!("{}/a.go", server.url()), None)
            .await
            .unwrap();
        assert_eq!(&body[..], b"package a");
    }

    #[tokio::test]
    async fn test_get_bytes_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let result = fetcher()
            .get_bytes(&format!("{}/missing", server.url()), None)
            .await;
        match result {
            Err(WalkerError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_json_with_headers() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repo")
            .match_header("authorization", "token abc")
            .with_status(200)
            .with_body(r#"{"watchers": 7}"#)
            .create_async()
            .await;

        #[derive(serde::Deserialize)]
        struct Repo {
            watchers: i64,
        }

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "token abc".parse().unwrap());
        let repo: Repo = fetcher()
            .get_json(&format!("{}/repo", server.url()), Some(&headers))
            .await
            .unwrap();
        assert_eq!(repo.watchers, 7);
    }

    #[tokio::test]
    async fn test_fetch_files_fills_data() {
        let mut server = mockito::Server::new_async().await;
        let _a = server
            .mock("GET", "/a.go")
            .with_body("package a")
            .create_async()
            .await;
        let _b = server
            .mock("GET", "/b.go")
            .with_body("package b")
            .create_async()
            .await;

        let mut files = vec![
            Source::new("a.go", "", format!("{}/a.go", server.url())),
            Source::new("b.go", "", format!("{}/b.go", server.url())),
        ];
        fetcher().fetch_files(&mut files, None).await.unwrap();

        assert_eq!(files[0].data, b"package a");
        assert_eq!(files[1].data, b"package b");
    }

    #[tokio::test]
    async fn test_fetch_files_aborts_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let _a = server
            .mock("GET", "/a.go")
            .with_body("package a")
            .create_async()
            .await;
        let _b = server
            .mock("GET", "/b.go")
            .with_status(500)
            .create_async()
            .await;

        let mut files = vec![
            Source::new("a.go", "", format!("{}/a.go", server.url())),
            Source::new("b.go", "", format!("{}/b.go", server.url())),
        ];
        let err = fetcher().fetch_files(&mut files, None).await.unwrap_err();

        match err {
            WalkerError::FetchFile { name, .. } => assert_eq!(name, "b.go"),
            other => panic!("expected FetchFile, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_idle_connections_keeps_fetcher_usable() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/x")
            .with_body("ok")
            .expect(2)
            .create_async()
            .await;

        let http = fetcher();
        let url = format!("{}/x", server.url());
        http.get_bytes(&url, None).await.unwrap();
        http.close_idle_connections().unwrap();
        http.get_bytes(&url, None).await.unwrap();
    }
}
