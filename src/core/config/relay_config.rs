use anyhow::{Context, Result};

use super::{lookup_env, normalize_string, parse_or};

pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1-0528:free";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_APP_TITLE: &str = "AI Charakter-Chat App";

/// Configuration for outbound completion calls.
///
/// Built once at startup and handed to the relay service; nothing in the
/// request path reads the process environment.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Full chat-completions endpoint.
    pub upstream_url: String,
    /// Bearer credential. Checked on every request, not at startup.
    pub api_key: Option<String>,
    /// Model used when the caller does not name one.
    pub default_model: String,
    /// Sampling temperature used when the caller does not send one.
    pub default_temperature: f64,
    /// Attribution headers some providers use for ranking.
    pub http_referer: Option<String>,
    pub app_title: Option<String>,
    /// Connection establishment timeout. Streams are never cut by a total timeout.
    pub connect_timeout_ms: u64,
    /// Number of chunks buffered between the upstream reader and the client writer.
    pub stream_buffer_chunks: usize,
    /// Target language of generated titles.
    pub title_language: String,
    pub title_max_tokens: u32,
    pub title_temperature: f64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.into(),
            api_key: None,
            default_model: DEFAULT_MODEL.into(),
            default_temperature: DEFAULT_TEMPERATURE,
            http_referer: None,
            app_title: Some(DEFAULT_APP_TITLE.into()),
            connect_timeout_ms: 10_000,
            stream_buffer_chunks: 16,
            title_language: "German".into(),
            title_max_tokens: 20,
            title_temperature: 0.5,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(lookup_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let upstream_url = lookup("RELAY_UPSTREAM_URL")
            .and_then(normalize_string)
            .map(|url| completions_url(&url))
            .unwrap_or(defaults.upstream_url);

        let api_key = lookup("OPENROUTER_API_KEY")
            .and_then(normalize_string)
            .or_else(|| lookup("RELAY_API_KEY").and_then(normalize_string));

        let app_title = match lookup("RELAY_APP_TITLE") {
            Some(v) => normalize_string(v),
            None => defaults.app_title,
        };

        Ok(Self {
            upstream_url,
            api_key,
            default_model: lookup("RELAY_DEFAULT_MODEL")
                .and_then(normalize_string)
                .unwrap_or(defaults.default_model),
            default_temperature: parse_or(
                &lookup,
                "RELAY_DEFAULT_TEMPERATURE",
                defaults.default_temperature,
            )?,
            http_referer: lookup("RELAY_HTTP_REFERER").and_then(normalize_string),
            app_title,
            connect_timeout_ms: parse_or(
                &lookup,
                "RELAY_CONNECT_TIMEOUT_MS",
                defaults.connect_timeout_ms,
            )?,
            stream_buffer_chunks: parse_or(
                &lookup,
                "RELAY_STREAM_BUFFER",
                defaults.stream_buffer_chunks,
            )
            .and_then(|n: usize| {
                (n > 0)
                    .then_some(n)
                    .context("RELAY_STREAM_BUFFER must be greater than zero")
            })?,
            title_language: lookup("RELAY_TITLE_LANGUAGE")
                .and_then(normalize_string)
                .unwrap_or(defaults.title_language),
            title_max_tokens: defaults.title_max_tokens,
            title_temperature: defaults.title_temperature,
        })
    }

    /// Mask the key for safe display (keeps last 4 chars).
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|t| {
            if t.len() <= 8 {
                "***".into()
            } else {
                let tail = &t[t.len().saturating_sub(4)..];
                format!("***{}", tail)
            }
        })
    }
}

/// Accepts either a provider base URL or the full completions endpoint.
fn completions_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}
