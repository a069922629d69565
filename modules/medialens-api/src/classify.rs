/// Extraction strategy for a URL, decided by substring/domain match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// A redirecting short link that must be expanded first.
    ShortLink,
    /// An Instagram post, handled by the platform-specific extractor.
    Instagram,
    /// Everything else goes to the generic video extractor.
    Generic,
}

/// TikTok short-link path patterns that need redirect expansion.
const SHORT_LINK_PATTERNS: &[&str] = &["tiktok.com/t/", "vm.tiktok.com/"];

const INSTAGRAM_DOMAIN: &str = "instagram.com";

/// Classify a URL. There is no error path, anything unmatched falls through
/// to the generic extractor, which decides for itself whether it can handle it.
pub fn classify(url: &str) -> UrlKind {
    if SHORT_LINK_PATTERNS.iter().any(|p| url.contains(p)) {
        UrlKind::ShortLink
    } else if url.contains(INSTAGRAM_DOMAIN) {
        UrlKind::Instagram
    } else {
        UrlKind::Generic
    }
}
