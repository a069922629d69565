use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{InstagramError, Result};
use crate::types::LoginResponse;
use crate::{cookie_value, APP_ID_HEADER, USER_AGENT, X_IG_APP_ID};

/// Persisted login state. Written to disk after every (re)login and reused
/// across process restarts. The device id is generated once and survives
/// re-authentication so the account keeps a stable device identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub username: String,
    pub user_id: Option<String>,
    pub device_id: String,
    pub csrf_token: String,
    pub session_id: String,
    pub logged_in_at: DateTime<Utc>,
}

impl SessionState {
    /// Cookie header value carrying the authenticated session.
    pub fn cookie_header(&self) -> String {
        format!("sessionid={}; csrftoken={}", self.session_id, self.csrf_token)
    }
}

/// Owns the process-wide authenticated session behind a mutex. Lookup code
/// calls `acquire` for the current session and `refresh` when the platform
/// rejects it; the underlying login client is not safe to drive concurrently.
pub struct SessionManager {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    session_file: PathBuf,
    state: Mutex<Option<SessionState>>,
}

impl SessionManager {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        session_file: impl Into<PathBuf>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            session_file: session_file.into(),
            state: Mutex::new(None),
        }
    }

    /// Current session: cached in memory, else loaded from disk, else a fresh
    /// login. Authentication is lazy; nothing happens until the first lookup
    /// needs it.
    pub async fn acquire(&self) -> Result<SessionState> {
        let mut guard = self.state.lock().await;
        if let Some(state) = guard.as_ref() {
            return Ok(state.clone());
        }

        if let Some(state) = self.load_from_disk() {
            info!(
                username = state.username.as_str(),
                path = %self.session_file.display(),
                "Loaded Instagram session from disk"
            );
            *guard = Some(state.clone());
            return Ok(state);
        }

        let state = self.login(new_device_id()).await?;
        self.persist(&state)?;
        *guard = Some(state.clone());
        Ok(state)
    }

    /// Force a re-login, keeping the device identity of the invalidated
    /// session, and persist the new state.
    pub async fn refresh(&self) -> Result<SessionState> {
        let mut guard = self.state.lock().await;
        let device_id = guard
            .as_ref()
            .map(|s| s.device_id.clone())
            .or_else(|| self.load_from_disk().map(|s| s.device_id))
            .unwrap_or_else(new_device_id);

        info!(username = self.username.as_str(), "Refreshing Instagram session");
        let state = self.login(device_id).await?;
        self.persist(&state)?;
        *guard = Some(state.clone());
        Ok(state)
    }

    /// Web login: fetch a csrf token from the login page, then post the
    /// browser-style enc_password form and capture the session cookie.
    async fn login(&self, device_id: String) -> Result<SessionState> {
        let login_page = self
            .client
            .get(format!("{}/accounts/login/", self.base_url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        let csrf_token = cookie_value(login_page.headers(), "csrftoken")
            .ok_or_else(|| InstagramError::Auth("No csrftoken issued by login page".to_string()))?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            Utc::now().timestamp(),
            self.password
        );

        let resp = self
            .client
            .post(format!("{}/api/v1/web/accounts/login/ajax/", self.base_url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(APP_ID_HEADER, X_IG_APP_ID)
            .header("X-CSRFToken", &csrf_token)
            .form(&[
                ("username", self.username.as_str()),
                ("enc_password", enc_password.as_str()),
            ])
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

        let session_id = cookie_value(resp.headers(), "sessionid");
        let csrf_token = cookie_value(resp.headers(), "csrftoken").unwrap_or(csrf_token);
        let body: LoginResponse = resp.json().await?;

        if !body.authenticated {
            return Err(InstagramError::Auth(format!(
                "Login rejected for '{}'",
                self.username
            )));
        }
        let session_id = session_id
            .ok_or_else(|| InstagramError::Auth("Login succeeded without a session cookie".to_string()))?;

        info!(username = self.username.as_str(), "Instagram login succeeded");
        Ok(SessionState {
            username: self.username.clone(),
            user_id: body.user_id,
            device_id,
            csrf_token,
            session_id,
            logged_in_at: Utc::now(),
        })
    }

    fn load_from_disk(&self) -> Option<SessionState> {
        let content = std::fs::read_to_string(&self.session_file).ok()?;
        match serde_json::from_str::<SessionState>(&content) {
            Ok(state) if state.username == self.username => Some(state),
            Ok(state) => {
                warn!(
                    on_disk = state.username.as_str(),
                    configured = self.username.as_str(),
                    "Session file belongs to a different account, ignoring"
                );
                None
            }
            Err(e) => {
                warn!(path = %self.session_file.display(), error = %e, "Unreadable session file, ignoring");
                None
            }
        }
    }

    fn persist(&self, state: &SessionState) -> Result<()> {
        if let Some(dir) = self.session_file.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.session_file, json)?;
        info!(path = %self.session_file.display(), "Instagram session persisted");
        Ok(())
    }
}

/// Random android-style device identifier, generated once per account.
fn new_device_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 8] = rng.random();
    format!(
        "android-{}",
        bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
    )
}
