use std::env;

/// Which Instagram lookup backend to run. Exactly one is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstagramBackend {
    /// Authenticated session persisted to disk, private API fallback.
    Session,
    /// Public post query, optional per-instance login.
    Public,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Rotating proxy
    pub scraperapi_key: String,
    pub proxy_host: String,
    pub proxy_port: u16,

    // Instagram
    pub instagram_backend: InstagramBackend,
    pub instagram_username: Option<String>,
    pub instagram_password: Option<String>,
    pub instagram_session_file: String,

    // Web server
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        let instagram_backend = match env::var("INSTAGRAM_BACKEND").as_deref() {
            Ok("session") => InstagramBackend::Session,
            Ok("public") | Err(_) => InstagramBackend::Public,
            Ok(other) => panic!("INSTAGRAM_BACKEND must be 'session' or 'public', got '{other}'"),
        };

        let instagram_username = env::var("INSTAGRAM_USERNAME").ok();
        let instagram_password = env::var("INSTAGRAM_PASSWORD").ok();
        if instagram_backend == InstagramBackend::Session
            && (instagram_username.is_none() || instagram_password.is_none())
        {
            panic!("INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD are required when INSTAGRAM_BACKEND=session");
        }

        Self {
            scraperapi_key: required_env("SCRAPERAPI_KEY"),
            proxy_host: env::var("PROXY_HOST")
                .unwrap_or_else(|_| "proxy-server.scraperapi.com".to_string()),
            proxy_port: env::var("PROXY_PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .expect("PROXY_PORT must be a number"),
            instagram_backend,
            instagram_username,
            instagram_password,
            instagram_session_file: env::var("INSTAGRAM_SESSION_FILE")
                .unwrap_or_else(|_| "instagram_session.json".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
