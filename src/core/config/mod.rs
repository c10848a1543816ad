//! Process configuration, read once at startup.

pub mod relay_config;
pub mod server_config;

use std::str::FromStr;

use anyhow::{Context, Result};

pub(crate) fn lookup_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

pub(crate) fn normalize_string(v: String) -> Option<String> {
    let s = v.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse an optional variable, falling back to `default` when unset or blank.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).and_then(normalize_string) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
