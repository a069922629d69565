use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

const RESOLVE_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTS: usize = 10;

/// Expands a short link into its canonical URL. Callers always treat a
/// failure as "use the original URL", since resolution must never abort a batch.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<String>;
}

/// Resolver that issues a redirect-following GET and reports the final URL.
pub struct HttpResolver {
    client: reqwest::Client,
}

impl HttpResolver {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkResolver for HttpResolver {
    async fn resolve(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Short-link request failed")?;
        let resolved = resp.url().to_string();
        debug!(url, resolved = resolved.as_str(), "Short link resolved");
        Ok(resolved)
    }
}
