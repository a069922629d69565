use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use instagram_client::{PostInfo, PublicClient, SessionClient};
use medialens_common::MediaRecord;

use super::MediaExtractor;

/// Platform-specific Instagram extractor. Exactly one backend is active per
/// deployment, selected by configuration.
pub enum InstagramExtractor {
    Session(SessionClient),
    Public(PublicClient),
}

impl InstagramExtractor {
    fn backend(&self) -> &'static str {
        match self {
            Self::Session(_) => "session",
            Self::Public(_) => "public",
        }
    }
}

#[async_trait]
impl MediaExtractor for InstagramExtractor {
    async fn extract(&self, url: &str) -> Result<MediaRecord> {
        let post = match self {
            Self::Session(client) => client.fetch_post(url).await?,
            Self::Public(client) => client.fetch_post(url).await?,
        };
        debug!(url, backend = self.backend(), "Instagram extraction complete");
        Ok(record_from_post(url, post))
    }
}

fn record_from_post(url: &str, post: PostInfo) -> MediaRecord {
    MediaRecord {
        url: url.to_string(),
        title: post.caption,
        duration: None,
        view_count: post.view_count,
        like_count: post.like_count,
        upload_date: post.taken_at.map(|at| at.format("%Y-%m-%d").to_string()),
        author: post.author,
        comments: post.comment_count,
        shares: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn post() -> PostInfo {
        PostInfo {
            shortcode: "Cabc".to_string(),
            caption: Some("a caption".to_string()),
            author: Some("author_handle".to_string()),
            like_count: Some(42),
            comment_count: Some(7),
            view_count: Some(1200),
            taken_at: DateTime::<Utc>::from_timestamp(1673740800, 0),
            is_video: true,
            media_url: Some("https://cdn.example/v.mp4".to_string()),
            media_type: Some("video".to_string()),
        }
    }

    #[test]
    fn record_maps_post_fields() {
        let record = record_from_post("https://www.instagram.com/p/Cabc/", post());
        assert_eq!(record.url, "https://www.instagram.com/p/Cabc/");
        assert_eq!(record.title.as_deref(), Some("a caption"));
        assert_eq!(record.author.as_deref(), Some("author_handle"));
        assert_eq!(record.like_count, Some(42));
        assert_eq!(record.comments, Some(7));
        assert_eq!(record.upload_date.as_deref(), Some("2023-01-15"));
        assert!(record.duration.is_none());
        assert!(record.shares.is_none());
    }

    #[test]
    fn record_tolerates_sparse_post() {
        let sparse = PostInfo {
            caption: None,
            author: None,
            like_count: None,
            comment_count: None,
            view_count: None,
            taken_at: None,
            is_video: false,
            media_url: None,
            media_type: None,
            ..post()
        };
        let record = record_from_post("https://www.instagram.com/p/Cabc/", sparse);
        assert!(record.title.is_none());
        assert!(record.upload_date.is_none());
    }
}
