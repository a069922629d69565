use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use instagram_client::{PublicClient, SessionClient, SessionManager};
use medialens_api::extract::{Dispatcher, GenericExtractor, InstagramExtractor, ProxyConfig};
use medialens_api::resolve::HttpResolver;
use medialens_api::{app, AppState};
use medialens_common::{Config, InstagramBackend};
use ytdlp_client::YtdlpClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("medialens_api=info".parse()?))
        .init();

    let config = Config::from_env();

    let proxy = ProxyConfig {
        key: config.scraperapi_key.clone(),
        host: config.proxy_host.clone(),
        port: config.proxy_port,
    };
    let generic = GenericExtractor::new(YtdlpClient::new(), proxy);

    let instagram = match config.instagram_backend {
        InstagramBackend::Session => {
            // from_env guarantees credentials for this backend
            let username = config.instagram_username.as_deref().unwrap_or_default();
            let password = config.instagram_password.as_deref().unwrap_or_default();
            let session = Arc::new(SessionManager::new(
                instagram_client::BASE_URL,
                username,
                password,
                &config.instagram_session_file,
            ));
            info!(backend = "session", "Instagram backend configured");
            InstagramExtractor::Session(SessionClient::new(instagram_client::BASE_URL, session))
        }
        InstagramBackend::Public => {
            let mut client = PublicClient::new(instagram_client::BASE_URL);
            if let (Some(username), Some(password)) =
                (&config.instagram_username, &config.instagram_password)
            {
                client = client.with_login(username, password);
            }
            info!(backend = "public", "Instagram backend configured");
            InstagramExtractor::Public(client)
        }
    };

    let dispatcher = Dispatcher::new(
        Arc::new(HttpResolver::new()),
        Arc::new(generic),
        Arc::new(instagram),
    );

    let state = Arc::new(AppState { dispatcher });
    let addr = format!("{}:{}", config.host, config.port);
    info!("MediaLens API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
