pub mod error;
pub mod session;
pub mod types;

pub use error::{InstagramError, Result};
pub use session::{SessionManager, SessionState};
pub use types::PostInfo;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, SET_COOKIE, USER_AGENT as USER_AGENT_HEADER};
use tracing::{debug, info};

use types::{MediaInfoResponse, WebPostResponse};

pub const BASE_URL: &str = "https://www.instagram.com";

/// App id the instagram.com web client sends on API calls.
pub const X_IG_APP_ID: &str = "936619743392459";
pub const APP_ID_HEADER: &str = "X-IG-App-ID";

/// Desktop browser user agent; the web endpoints reject unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Alphabet Instagram uses to encode media pks into URL shortcodes.
const SHORTCODE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Derive the post shortcode from a post URL: the path segment immediately
/// preceding the trailing segment (`https://www.instagram.com/p/{code}/`).
pub fn shortcode_from_url(url: &str) -> Result<String> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return Err(InstagramError::BadUrl(url.to_string()));
    }
    let code = parts[parts.len() - 2];
    if code.is_empty() || code.contains('.') {
        return Err(InstagramError::BadUrl(url.to_string()));
    }
    Ok(code.to_string())
}

/// Decode a shortcode into the numeric media pk used by the private API.
/// Shortcodes longer than 11 characters carry extra private-account bits;
/// only the first 11 encode the pk.
pub fn media_pk_from_shortcode(shortcode: &str) -> Result<u64> {
    let mut pk: u64 = 0;
    for byte in shortcode.bytes().take(11) {
        let idx = SHORTCODE_ALPHABET
            .iter()
            .position(|&c| c == byte)
            .ok_or_else(|| InstagramError::BadUrl(format!("Invalid shortcode '{shortcode}'")))?;
        pk = pk
            .checked_mul(64)
            .and_then(|v| v.checked_add(idx as u64))
            .ok_or_else(|| InstagramError::BadUrl(format!("Shortcode overflow '{shortcode}'")))?;
    }
    Ok(pk)
}

/// Pull a cookie's value out of `Set-Cookie` response headers.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get_all(SET_COOKIE).iter().find_map(|header| {
        let raw = header.to_str().ok()?;
        let (key, rest) = raw.split_once('=')?;
        if key.trim() != name {
            return None;
        }
        let value = rest.split(';').next()?.trim();
        if value.is_empty() || value == "\"\"" {
            None
        } else {
            Some(value.to_string())
        }
    })
}

// --- Authenticated session backend ---

/// Post lookup backed by a persistent authenticated session. Tries the public
/// web query first and falls back to the private media-info API; a rejected
/// session is refreshed once and the lookup retried.
pub struct SessionClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl SessionClient {
    pub fn new(base_url: &str, session: Arc<SessionManager>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub async fn fetch_post(&self, url: &str) -> Result<PostInfo> {
        let shortcode = shortcode_from_url(url)?;

        match self.fetch_web(&shortcode).await {
            Ok(post) => Ok(post),
            Err(e) => {
                debug!(shortcode = shortcode.as_str(), error = %e, "Public query failed, trying private API");
                self.fetch_private(&shortcode).await
            }
        }
    }

    /// Anonymous web query path, no session required.
    async fn fetch_web(&self, shortcode: &str) -> Result<PostInfo> {
        let url = format!("{}/p/{}/?__a=1&__d=dis", self.base_url, shortcode);
        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(APP_ID_HEADER, X_IG_APP_ID)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InstagramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: WebPostResponse = resp.json().await?;
        Ok(body.graphql.shortcode_media.into_post_info(shortcode))
    }

    /// Private API path. Requires the session; on 401/403 the session is
    /// refreshed and the call retried once.
    async fn fetch_private(&self, shortcode: &str) -> Result<PostInfo> {
        let pk = media_pk_from_shortcode(shortcode)?;

        let state = self.session.acquire().await?;
        match self.media_info(pk, shortcode, &state).await {
            Err(InstagramError::Api { status, .. }) if status == 401 || status == 403 => {
                info!(shortcode, status, "Session rejected, re-authenticating");
                let state = self.session.refresh().await?;
                self.media_info(pk, shortcode, &state).await
            }
            other => other,
        }
    }

    async fn media_info(
        &self,
        pk: u64,
        shortcode: &str,
        state: &SessionState,
    ) -> Result<PostInfo> {
        let url = format!("{}/api/v1/media/{}/info/", self.base_url, pk);
        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(APP_ID_HEADER, X_IG_APP_ID)
            .header("X-CSRFToken", &state.csrf_token)
            .header(reqwest::header::COOKIE, state.cookie_header())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InstagramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MediaInfoResponse = resp.json().await?;
        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| InstagramError::NotFound(shortcode.to_string()))?;
        Ok(item.into_post_info(shortcode))
    }
}

// --- Public scrape backend ---

/// Post lookup using only the public web query. Optionally logs in once per
/// instance (cookie jar carries the session) for sources that gate anonymous
/// access.
pub struct PublicClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
    logged_in: tokio::sync::Mutex<bool>,
}

impl PublicClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            logged_in: tokio::sync::Mutex::new(false),
        }
    }

    pub fn with_login(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    pub async fn fetch_post(&self, url: &str) -> Result<PostInfo> {
        let shortcode = shortcode_from_url(url)?;
        self.ensure_login().await?;

        let query = format!("{}/p/{}/?__a=1&__d=dis", self.base_url, shortcode);
        let resp = self
            .client
            .get(&query)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(APP_ID_HEADER, X_IG_APP_ID)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InstagramError::NotFound(shortcode));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InstagramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: WebPostResponse = resp.json().await?;
        Ok(body.graphql.shortcode_media.into_post_info(&shortcode))
    }

    /// Log in once if credentials were supplied. The cookie jar keeps the
    /// session for subsequent lookups on this instance.
    async fn ensure_login(&self) -> Result<()> {
        let Some((username, password)) = &self.credentials else {
            return Ok(());
        };
        let mut logged_in = self.logged_in.lock().await;
        if *logged_in {
            return Ok(());
        }

        let login_page = self
            .client
            .get(format!("{}/accounts/login/", self.base_url))
            .header(USER_AGENT_HEADER, USER_AGENT)
            .send()
            .await?;
        let csrf_token = cookie_value(login_page.headers(), "csrftoken")
            .ok_or_else(|| InstagramError::Auth("No csrftoken issued by login page".to_string()))?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            chrono::Utc::now().timestamp(),
            password
        );

        let resp = self
            .client
            .post(format!("{}/api/v1/web/accounts/login/ajax/", self.base_url))
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(APP_ID_HEADER, X_IG_APP_ID)
            .header("X-CSRFToken", &csrf_token)
            .form(&[("username", username.as_str()), ("enc_password", enc_password.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InstagramError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body: types::LoginResponse = resp.json().await?;
        if !body.authenticated {
            return Err(InstagramError::Auth(format!("Login rejected for '{username}'")));
        }

        info!(username = username.as_str(), "Instagram public-client login succeeded");
        *logged_in = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcode_from_post_url() {
        assert_eq!(
            shortcode_from_url("https://www.instagram.com/p/CxyzAbc1234/").unwrap(),
            "CxyzAbc1234"
        );
    }

    #[test]
    fn shortcode_from_reel_url() {
        assert_eq!(
            shortcode_from_url("https://www.instagram.com/reel/C12345abcde/").unwrap(),
            "C12345abcde"
        );
    }

    #[test]
    fn shortcode_survives_query_string() {
        assert_eq!(
            shortcode_from_url("https://www.instagram.com/p/Cabc/?utm_source=x").unwrap(),
            "Cabc"
        );
    }

    #[test]
    fn shortcode_rejects_hostname_segment() {
        assert!(shortcode_from_url("https://www.instagram.com/").is_err());
    }

    #[test]
    fn media_pk_decodes_known_shortcode() {
        // "B" is index 1, "C" index 2: "BC" -> 1*64 + 2
        assert_eq!(media_pk_from_shortcode("BC").unwrap(), 66);
        assert_eq!(media_pk_from_shortcode("A").unwrap(), 0);
        assert_eq!(media_pk_from_shortcode("_").unwrap(), 63);
    }

    #[test]
    fn media_pk_uses_first_eleven_chars() {
        let base = media_pk_from_shortcode("CxyzAbc1234").unwrap();
        let extended = media_pk_from_shortcode("CxyzAbc1234ZZZZZ").unwrap();
        assert_eq!(base, extended);
    }

    #[test]
    fn media_pk_rejects_invalid_chars() {
        assert!(media_pk_from_shortcode("has space").is_err());
        assert!(media_pk_from_shortcode("emoji💥").is_err());
    }

    #[test]
    fn cookie_value_parses_set_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            "csrftoken=tok123; Path=/; Secure".parse().unwrap(),
        );
        headers.append(
            SET_COOKIE,
            "sessionid=sess456; Path=/; HttpOnly".parse().unwrap(),
        );
        assert_eq!(cookie_value(&headers, "csrftoken").as_deref(), Some("tok123"));
        assert_eq!(cookie_value(&headers, "sessionid").as_deref(), Some("sess456"));
        assert_eq!(cookie_value(&headers, "mid"), None);
    }

    #[test]
    fn cookie_value_ignores_cleared_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, "sessionid=\"\"; Max-Age=0".parse().unwrap());
        assert_eq!(cookie_value(&headers, "sessionid"), None);
    }
}
