use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- Normalized output ---

/// A single Instagram post, normalized across both lookup backends.
#[derive(Debug, Clone)]
pub struct PostInfo {
    pub shortcode: String,
    pub caption: Option<String>,
    pub author: Option<String>,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub view_count: Option<i64>,
    pub taken_at: Option<DateTime<Utc>>,
    pub is_video: bool,
    /// Direct URL of the video (or display image for photo posts).
    pub media_url: Option<String>,
    /// "video", "image" or "carousel".
    pub media_type: Option<String>,
}

// --- Public web query types (`/p/{shortcode}/?__a=1&__d=dis`) ---

#[derive(Debug, Clone, Deserialize)]
pub struct WebPostResponse {
    pub graphql: GraphqlContainer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlContainer {
    pub shortcode_media: ShortcodeMedia,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortcodeMedia {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub shortcode: Option<String>,
    pub is_video: Option<bool>,
    pub video_url: Option<String>,
    pub display_url: Option<String>,
    pub taken_at_timestamp: Option<i64>,
    pub video_view_count: Option<i64>,
    pub owner: Option<MediaOwner>,
    pub edge_media_to_caption: Option<EdgeList>,
    pub edge_media_preview_like: Option<EdgeCount>,
    pub edge_media_to_comment: Option<EdgeCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaOwner {
    pub username: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeList {
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge {
    pub node: EdgeNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeNode {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeCount {
    pub count: Option<i64>,
}

impl ShortcodeMedia {
    /// Normalize the GraphQL media shape. `GraphSidecar` means carousel.
    pub fn into_post_info(self, shortcode: &str) -> PostInfo {
        let caption = self
            .edge_media_to_caption
            .and_then(|c| c.edges.into_iter().next())
            .and_then(|e| e.node.text);
        let is_video = self.is_video.unwrap_or(false);
        let media_type = match self.typename.as_deref() {
            Some("GraphSidecar") => Some("carousel".to_string()),
            _ if is_video => Some("video".to_string()),
            _ => Some("image".to_string()),
        };
        PostInfo {
            shortcode: shortcode.to_string(),
            caption,
            author: self.owner.and_then(|o| o.username),
            like_count: self.edge_media_preview_like.and_then(|e| e.count),
            comment_count: self.edge_media_to_comment.and_then(|e| e.count),
            view_count: self.video_view_count,
            taken_at: self
                .taken_at_timestamp
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            media_url: if is_video { self.video_url } else { self.display_url },
            is_video,
            media_type,
        }
    }
}

// --- Private API types (`/api/v1/media/{pk}/info/`) ---

#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfoResponse {
    #[serde(default)]
    pub items: Vec<MediaItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaItem {
    pub code: Option<String>,
    /// 1 = photo, 2 = video, 8 = carousel.
    pub media_type: Option<i64>,
    pub taken_at: Option<i64>,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub view_count: Option<i64>,
    pub caption: Option<MediaCaption>,
    pub user: Option<MediaUser>,
    #[serde(default)]
    pub video_versions: Vec<VideoVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaCaption {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaUser {
    pub username: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoVersion {
    pub url: Option<String>,
}

impl MediaItem {
    pub fn into_post_info(self, shortcode: &str) -> PostInfo {
        let is_video = self.media_type == Some(2);
        let media_type = match self.media_type {
            Some(1) => Some("image".to_string()),
            Some(2) => Some("video".to_string()),
            Some(8) => Some("carousel".to_string()),
            _ => None,
        };
        PostInfo {
            shortcode: shortcode.to_string(),
            caption: self.caption.and_then(|c| c.text),
            author: self.user.and_then(|u| u.username),
            like_count: self.like_count,
            comment_count: self.comment_count,
            view_count: self.view_count,
            taken_at: self
                .taken_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            media_url: self.video_versions.into_iter().find_map(|v| v.url),
            is_video,
            media_type,
        }
    }
}

// --- Login types ---

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_media_maps_video_fields() {
        let raw = r#"{
            "graphql": {
                "shortcode_media": {
                    "__typename": "GraphVideo",
                    "shortcode": "CxyzAbc1234",
                    "is_video": true,
                    "video_url": "https://cdn.example/v.mp4",
                    "display_url": "https://cdn.example/v.jpg",
                    "taken_at_timestamp": 1673740800,
                    "video_view_count": 1200,
                    "owner": {"username": "someone", "full_name": "Some One"},
                    "edge_media_to_caption": {"edges": [{"node": {"text": "hello"}}]},
                    "edge_media_preview_like": {"count": 42},
                    "edge_media_to_comment": {"count": 7}
                }
            }
        }"#;
        let resp: WebPostResponse = serde_json::from_str(raw).unwrap();
        let post = resp.graphql.shortcode_media.into_post_info("CxyzAbc1234");
        assert!(post.is_video);
        assert_eq!(post.media_type.as_deref(), Some("video"));
        assert_eq!(post.media_url.as_deref(), Some("https://cdn.example/v.mp4"));
        assert_eq!(post.caption.as_deref(), Some("hello"));
        assert_eq!(post.author.as_deref(), Some("someone"));
        assert_eq!(post.like_count, Some(42));
        assert_eq!(post.comment_count, Some(7));
        assert_eq!(post.view_count, Some(1200));
    }

    #[test]
    fn web_media_photo_uses_display_url() {
        let raw = r#"{
            "graphql": {
                "shortcode_media": {
                    "__typename": "GraphImage",
                    "is_video": false,
                    "display_url": "https://cdn.example/p.jpg"
                }
            }
        }"#;
        let resp: WebPostResponse = serde_json::from_str(raw).unwrap();
        let post = resp.graphql.shortcode_media.into_post_info("Cabc");
        assert!(!post.is_video);
        assert_eq!(post.media_type.as_deref(), Some("image"));
        assert_eq!(post.media_url.as_deref(), Some("https://cdn.example/p.jpg"));
    }

    #[test]
    fn private_media_item_maps_fields() {
        let raw = r#"{
            "items": [{
                "code": "Cabc",
                "media_type": 2,
                "taken_at": 1673740800,
                "like_count": 10,
                "comment_count": 3,
                "view_count": 99,
                "caption": {"text": "caption text"},
                "user": {"username": "author_handle"},
                "video_versions": [{"url": "https://cdn.example/a.mp4"}]
            }]
        }"#;
        let resp: MediaInfoResponse = serde_json::from_str(raw).unwrap();
        let post = resp.items.into_iter().next().unwrap().into_post_info("Cabc");
        assert_eq!(post.media_type.as_deref(), Some("video"));
        assert_eq!(post.author.as_deref(), Some("author_handle"));
        assert_eq!(post.caption.as_deref(), Some("caption text"));
        assert_eq!(post.media_url.as_deref(), Some("https://cdn.example/a.mp4"));
    }
}
