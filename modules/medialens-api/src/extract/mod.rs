pub mod generic;
pub mod instagram;

pub use generic::{GenericExtractor, ProxyConfig};
pub use instagram::InstagramExtractor;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::warn;

use medialens_common::{ExtractionResult, MediaRecord};

use crate::classify::{classify, UrlKind};
use crate::resolve::LinkResolver;

/// Turns a canonical URL into a normalized metadata record. Errors stay
/// inside the dispatcher, where they become per-URL Failure results rather
/// than batch-level failures.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<MediaRecord>;
}

/// URLs within one batch run concurrently up to this bound; the proxy
/// provider throttles well before the runtime does.
const MAX_CONCURRENT_URLS: usize = 4;

/// Batch orchestrator: classify, resolve, dispatch, one result per input URL
/// in input order.
pub struct Dispatcher {
    resolver: Arc<dyn LinkResolver>,
    generic: Arc<dyn MediaExtractor>,
    instagram: Arc<dyn MediaExtractor>,
}

impl Dispatcher {
    pub fn new(
        resolver: Arc<dyn LinkResolver>,
        generic: Arc<dyn MediaExtractor>,
        instagram: Arc<dyn MediaExtractor>,
    ) -> Self {
        Self {
            resolver,
            generic,
            instagram,
        }
    }

    /// Process a batch. The output has exactly one entry per input URL, in
    /// input order: `buffered` preserves ordering by index regardless of
    /// which extraction finishes first.
    pub async fn run(&self, urls: Vec<String>) -> Vec<ExtractionResult> {
        futures::stream::iter(urls.into_iter().map(|url| self.extract_one(url)))
            .buffered(MAX_CONCURRENT_URLS)
            .collect()
            .await
    }

    /// Every result, success or failure, is keyed to the original input
    /// URL, not the resolved form.
    async fn extract_one(&self, url: String) -> ExtractionResult {
        let resolved = match classify(&url) {
            UrlKind::ShortLink => self.resolver.resolve(&url).await.unwrap_or_else(|e| {
                warn!(url = url.as_str(), error = %e, "Short-link resolution failed, using original URL");
                url.clone()
            }),
            _ => url.clone(),
        };

        let outcome = match classify(&resolved) {
            UrlKind::Instagram => self.instagram.extract(&resolved).await,
            _ => self.generic.extract(&resolved).await,
        };

        match outcome {
            Ok(mut record) => {
                record.url = url;
                ExtractionResult::Success(record)
            }
            Err(e) => {
                warn!(url = url.as_str(), error = %e, "Extraction failed");
                ExtractionResult::failure(url, e)
            }
        }
    }
}
