//! Configuration parsing and validation for the gateway
//!
//! Values are read from command-line flags or the environment (a `.env` file is loaded
//! beforehand by the binary). The parsed [`Config`] is turned into an [`UpstreamConfig`]
//! once at startup and handed to the dispatcher.
use anyhow::anyhow;
use bon::Builder;
use clap::Parser;
use url::Url;

pub const DEFAULT_COMPLETIONS_URL: &str = "https://fast.typegpt.net/v1/chat/completions";
pub const DEFAULT_PROMPT_URL: &str = "https://api.puter.com/chat";

#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The port on which the gateway will listen.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 10000)]
    pub port: u16,

    /// The address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Bearer credential sent to the completions upstream.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Endpoint of the token-limited chat completions service.
    #[arg(long, env = "COMPLETIONS_URL", default_value = DEFAULT_COMPLETIONS_URL)]
    pub completions_url: Url,

    /// Endpoint of the prompt-based chat service.
    #[arg(long, env = "PROMPT_URL", default_value = DEFAULT_PROMPT_URL)]
    pub prompt_url: Url,

    /// Maximum number of idle HTTP connections to keep alive per upstream host.
    #[arg(long, default_value_t = 100)]
    pub pool_max_idle_per_host: usize,

    /// How long (in seconds) to keep idle HTTP connections alive.
    #[arg(long, default_value_t = 90)]
    pub pool_idle_timeout_secs: u64,
}

impl Config {
    pub fn validate(self) -> Result<Self, anyhow::Error> {
        for (name, url) in [
            ("completions-url", &self.completions_url),
            ("prompt-url", &self.prompt_url),
        ] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!(
                    "--{name} must be an http(s) URL, got '{url}'"
                ));
            }
        }
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            tracing::warn!("API_KEY is not set; completions upstream calls will likely be rejected");
        }
        Ok(self)
    }

    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig::builder()
            .completions_url(self.completions_url.clone())
            .prompt_url(self.prompt_url.clone())
            .maybe_api_key(self.api_key.clone())
            .build()
    }
}

/// Settings shared by the outbound callers. Constructed once and never mutated.
#[derive(Clone, Builder)]
pub struct UpstreamConfig {
    pub completions_url: Url,
    pub prompt_url: Url,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("completions_url", &self.completions_url.as_str())
            .field("prompt_url", &self.prompt_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
