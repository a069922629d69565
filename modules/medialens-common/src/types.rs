use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Normalized metadata for one successfully extracted URL. Every field except
/// `url` depends on what the underlying source exposes; nulls are serialized
/// explicitly so batch consumers see a stable shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaRecord {
    pub url: String,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    pub upload_date: Option<String>,
    pub author: Option<String>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
}

/// One entry in the batch response, keyed by the original input URL.
/// Serializes untagged: a success is the record object, a failure is
/// `{"url": .., "error": ..}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Success(MediaRecord),
    Failure { url: String, error: String },
}

impl ExtractionResult {
    pub fn failure(url: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Failure {
            url: url.into(),
            error: error.to_string(),
        }
    }

    /// The original input URL this result is keyed to.
    pub fn url(&self) -> &str {
        match self {
            Self::Success(record) => &record.url,
            Self::Failure { url, .. } => url,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// Reformat an 8-digit `YYYYMMDD` upload date to ISO `YYYY-MM-DD`.
/// Anything that doesn't parse as such a date passes through unmodified.
pub fn normalize_upload_date(raw: Option<String>) -> Option<String> {
    raw.map(|s| match NaiveDate::parse_from_str(&s, "%Y%m%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_date_normalized() {
        assert_eq!(
            normalize_upload_date(Some("20230115".to_string())),
            Some("2023-01-15".to_string())
        );
    }

    #[test]
    fn upload_date_absent_stays_none() {
        assert_eq!(normalize_upload_date(None), None);
    }

    #[test]
    fn upload_date_malformed_passes_through() {
        assert_eq!(
            normalize_upload_date(Some("2023-01-15".to_string())),
            Some("2023-01-15".to_string())
        );
        assert_eq!(
            normalize_upload_date(Some("20231345".to_string())),
            Some("20231345".to_string())
        );
    }

    #[test]
    fn success_serializes_flat_with_nulls() {
        let record = MediaRecord {
            url: "https://example.com/v/1".to_string(),
            title: Some("A title".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(ExtractionResult::Success(record)).unwrap();
        assert_eq!(json["url"], "https://example.com/v/1");
        assert_eq!(json["title"], "A title");
        assert!(json["view_count"].is_null());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_serializes_url_and_error_only() {
        let json =
            serde_json::to_value(ExtractionResult::failure("https://bad.example", "boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "https://bad.example", "error": "boom"})
        );
    }
}
