use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use medialens_common::{normalize_upload_date, MediaRecord};
use ytdlp_client::YtdlpClient;

use super::MediaExtractor;

/// Rotating proxy endpoint and credential. Each extraction gets its own
/// randomized session number so the provider assigns distinct exit IPs and
/// rate limits don't correlate across URLs.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub key: String,
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    /// Full proxy URL scoped to a fresh random session.
    pub fn session_url(&self) -> String {
        let session: u32 = rand::rng().random_range(0..1_000_000);
        format!(
            "http://scraperapi.session_number={}:{}@{}:{}",
            session, self.key, self.host, self.port
        )
    }
}

/// Generic extractor: any URL yt-dlp knows how to handle, routed through the
/// rotating proxy, normalized into a `MediaRecord`.
pub struct GenericExtractor {
    client: YtdlpClient,
    proxy: ProxyConfig,
}

impl GenericExtractor {
    pub fn new(client: YtdlpClient, proxy: ProxyConfig) -> Self {
        Self { client, proxy }
    }
}

#[async_trait]
impl MediaExtractor for GenericExtractor {
    async fn extract(&self, url: &str) -> Result<MediaRecord> {
        let proxy = self.proxy.session_url();
        let info = self.client.fetch_info(url, Some(&proxy)).await?;
        debug!(url, "Generic extraction complete");

        Ok(MediaRecord {
            url: url.to_string(),
            title: info.title,
            duration: info.duration,
            view_count: info.view_count,
            like_count: info.like_count,
            upload_date: normalize_upload_date(info.upload_date),
            author: info.uploader,
            comments: info.comment_count,
            shares: info.repost_count,
        })
    }
}
