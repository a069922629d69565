use serde::Deserialize;

/// Metadata for a single video as reported by `yt-dlp --dump-single-json`.
/// Every field is optional; extractors differ wildly in what they populate.
/// Unknown fields in the (very large) yt-dlp output are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    /// 8-digit `YYYYMMDD` string, when known.
    pub upload_date: Option<String>,
    pub uploader: Option<String>,
    pub comment_count: Option<i64>,
    pub repost_count: Option<i64>,
}
