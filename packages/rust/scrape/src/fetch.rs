//! Single-attempt HTTP fetch of the listing page.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use jobwatch_shared::{JobWatchError, Result};

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("jobwatch/", env!("CARGO_PKG_VERSION"));

/// Fetches the listing page. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| JobWatchError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and return the body. Non-2xx statuses are errors.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| JobWatchError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JobWatchError::Fetch(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| JobWatchError::Fetch(format!("{url}: body read failed: {e}")))?;

        debug!(status = status.as_u16(), bytes = body.len(), "fetched listing page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> PageFetcher {
        PageFetcher::new(Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events.php"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/events.php", server.uri())).unwrap();
        let body = fetcher().fetch(&url).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, JobWatchError::Fetch(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn unreachable_host_is_fetch_error() {
        let server = MockServer::start().await;
        let url = Url::parse(&server.uri()).unwrap();
        drop(server);

        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, JobWatchError::Fetch(_)));
    }
}
