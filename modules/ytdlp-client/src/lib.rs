pub mod error;
pub mod types;

pub use error::{Result, YtdlpError};
pub use types::VideoInfo;

use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Max concurrent yt-dlp processes. Each invocation spawns a Python
/// interpreter and holds a proxied socket open for the whole extraction.
const MAX_CONCURRENT_YTDLP: usize = 4;

/// Max attempts for transient spawn failures (e.g. "Cannot fork").
/// Network-level retries are yt-dlp's own job via `--retries`.
const YTDLP_MAX_ATTEMPTS: u32 = 2;
/// Base backoff for relaunch attempts. Actual delay is base * 3^attempt + jitter.
const YTDLP_RETRY_BASE: Duration = Duration::from_secs(2);

/// Hard wall-clock cap per invocation, on top of yt-dlp's socket timeout.
const YTDLP_WALL_TIMEOUT: Duration = Duration::from_secs(90);

/// Socket timeout passed to yt-dlp (`--socket-timeout`).
const SOCKET_TIMEOUT_SECS: u32 = 20;
/// Download-retry budget passed to yt-dlp (`--retries`).
const NETWORK_RETRIES: u32 = 2;

/// Client for the yt-dlp subprocess: `--dump-single-json` metadata extraction
/// with no download, optionally routed through an HTTP proxy.
pub struct YtdlpClient {
    bin: String,
    semaphore: Semaphore,
}

impl YtdlpClient {
    pub fn new() -> Self {
        let bin = std::env::var("YTDLP_BIN").unwrap_or_else(|_| "yt-dlp".to_string());
        info!(bin, max_concurrent = MAX_CONCURRENT_YTDLP, "Using YtdlpClient");
        Self {
            bin,
            semaphore: Semaphore::new(MAX_CONCURRENT_YTDLP),
        }
    }

    /// Extract metadata for one URL. `proxy` is a full proxy URL
    /// (credentials included) that all yt-dlp traffic is routed through.
    /// Certificate validation is relaxed because rotating proxies MITM TLS.
    pub async fn fetch_info(&self, url: &str, proxy: Option<&str>) -> Result<VideoInfo> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| YtdlpError::Launch("yt-dlp semaphore closed".to_string()))?;

        info!(url, "Extracting metadata via yt-dlp");

        let mut args: Vec<String> = vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-check-certificates".to_string(),
            format!("--socket-timeout={SOCKET_TIMEOUT_SECS}"),
            format!("--retries={NETWORK_RETRIES}"),
        ];
        if let Some(proxy) = proxy {
            args.push(format!("--proxy={proxy}"));
        }
        args.push(url.to_string());

        for attempt in 0..YTDLP_MAX_ATTEMPTS {
            let result = tokio::time::timeout(
                YTDLP_WALL_TIMEOUT,
                tokio::process::Command::new(&self.bin).args(&args).output(),
            )
            .await;

            match result {
                Ok(Ok(output)) => {
                    if output.status.success() {
                        if output.stdout.is_empty() {
                            return Err(YtdlpError::Extraction(
                                "yt-dlp produced no output".to_string(),
                            ));
                        }
                        let info: VideoInfo = serde_json::from_slice(&output.stdout)?;
                        info!(url, "Metadata extracted");
                        return Ok(info);
                    }
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(url, stderr = %stderr, "yt-dlp exited with error");
                    return Err(YtdlpError::Extraction(error_line(&stderr)));
                }
                Ok(Err(e)) => {
                    // Failed to spawn the process at all; retry transient errors
                    let msg = e.to_string();
                    if is_transient_spawn_failure(&msg) && attempt + 1 < YTDLP_MAX_ATTEMPTS {
                        let backoff = YTDLP_RETRY_BASE * 3u32.pow(attempt);
                        let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
                        warn!(
                            url,
                            attempt = attempt + 1,
                            backoff_secs = backoff.as_secs(),
                            error = %e,
                            "yt-dlp launch failed, retrying after backoff"
                        );
                        tokio::time::sleep(backoff + jitter).await;
                        continue;
                    }
                    return Err(YtdlpError::Launch(msg));
                }
                Err(_) => {
                    if attempt + 1 < YTDLP_MAX_ATTEMPTS {
                        let backoff = YTDLP_RETRY_BASE * 3u32.pow(attempt);
                        let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
                        warn!(
                            url,
                            attempt = attempt + 1,
                            backoff_secs = backoff.as_secs(),
                            "yt-dlp timed out, retrying after backoff"
                        );
                        tokio::time::sleep(backoff + jitter).await;
                        continue;
                    }
                    return Err(YtdlpError::Timeout(YTDLP_WALL_TIMEOUT.as_secs()));
                }
            }
        }

        Err(YtdlpError::Timeout(YTDLP_WALL_TIMEOUT.as_secs()))
    }
}

impl Default for YtdlpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn is_transient_spawn_failure(msg: &str) -> bool {
    msg.contains("Cannot fork") || msg.contains("Resource temporarily unavailable")
}

/// Pick the most useful line out of yt-dlp's stderr: the last `ERROR:` line,
/// stripped of its prefix, or the whole trimmed output if there is none.
fn error_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix("ERROR: "))
        .map(str::to_string)
        .unwrap_or_else(|| stderr.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_line_picks_last_error() {
        let stderr = "WARNING: unable to obtain file audio codec\n\
                      ERROR: Unsupported URL: https://example.com/page\n\
                      ERROR: [generic] nothing to extract\n";
        assert_eq!(error_line(stderr), "[generic] nothing to extract");
    }

    #[test]
    fn error_line_falls_back_to_whole_stderr() {
        assert_eq!(error_line("  something odd\n"), "something odd");
    }

    #[test]
    fn transient_spawn_failures_detected() {
        assert!(is_transient_spawn_failure("Cannot fork (os error 11)"));
        assert!(is_transient_spawn_failure("Resource temporarily unavailable"));
        assert!(!is_transient_spawn_failure("No such file or directory"));
    }
}
