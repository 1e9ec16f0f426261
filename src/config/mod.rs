use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Downstream document API used when a request carries no `target-url` header.
pub const DEFAULT_TARGET_URL: &str = "https://brtgw.britam.com/image_now/uat/api/v1/upload/";

/// Runtime configuration for the relay service
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listening port (default: 3000)
    pub port: u16,

    /// Downstream upload endpoint, overridable per request via `target-url`
    pub default_target_url: String,

    /// Header name carrying the forwarded subscription key
    /// (default: "Ocp-Apim-Subscription-Key")
    pub subscription_key_header: String,

    /// Upper bound on downloading the source file (default: 60s)
    pub fetch_timeout: Duration,

    /// Upper bound on the downstream multipart POST (default: 120s)
    pub forward_timeout: Duration,

    /// TCP connect timeout for outbound calls (default: 10s)
    pub connect_timeout: Duration,

    /// Directory holding per-request staging files (default: OS temp dir)
    pub staging_dir: PathBuf,

    /// Maximum inbound JSON body size in bytes (default: 1 MB)
    pub max_body_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            default_target_url: DEFAULT_TARGET_URL.to_string(),
            subscription_key_header: "Ocp-Apim-Subscription-Key".to_string(),
            fetch_timeout: Duration::from_secs(60),
            forward_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            staging_dir: env::temp_dir(),
            max_body_size: 1024 * 1024, // 1 MB
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            default_target_url: env::var("DEFAULT_TARGET_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.default_target_url),

            subscription_key_header: env::var("SUBSCRIPTION_KEY_HEADER")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.subscription_key_header),

            fetch_timeout: secs_from_env("FETCH_TIMEOUT_SECS").unwrap_or(default.fetch_timeout),

            forward_timeout: secs_from_env("FORWARD_TIMEOUT_SECS")
                .unwrap_or(default.forward_timeout),

            connect_timeout: secs_from_env("CONNECT_TIMEOUT_SECS")
                .unwrap_or(default.connect_timeout),

            staging_dir: env::var("STAGING_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.staging_dir),

            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_body_size),
        }
    }

    /// Create config for development and tests (short timeouts)
    pub fn development() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            forward_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }
}

fn secs_from_env(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
