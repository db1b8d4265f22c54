//! Page rendering capability and its default HTTP implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

const USER_AGENT: &str = "docsift/0.1";

/// Errors surfaced while rendering a page.
#[derive(Debug)]
pub enum RenderError {
    /// Transport-level failure (connect, TLS, client timeout).
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Status(u16),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

/// Capability interface for turning a URL into page markup.
///
/// The crawl loop only depends on this trait, so tests and alternative
/// fetch strategies (headless browsers, local fixtures) plug in without
/// touching the orchestration.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Fetches the markup behind `url`.
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Renderer backed by a plain HTTP client.
#[derive(Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Builds a renderer with the pipeline user agent, a bounded redirect
    /// policy, and a client-level timeout.
    pub fn new(timeout: Duration) -> Result<Self, RenderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test(flavor = "current_thread")]
    async fn renders_successful_responses() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200).body("<html><body>ok</body></html>");
            })
            .await;

        let renderer = HttpRenderer::new(Duration::from_secs(5)).expect("client");
        let body = renderer.render(&server.url("/page")).await.expect("render");
        assert!(body.contains("ok"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn surfaces_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let renderer = HttpRenderer::new(Duration::from_secs(5)).expect("client");
        let err = renderer
            .render(&server.url("/missing"))
            .await
            .expect_err("status error");
        assert!(matches!(err, RenderError::Status(404)));
    }
}
